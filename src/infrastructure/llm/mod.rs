//! LLM provider implementations

mod gemini;

pub use gemini::GeminiProvider;
