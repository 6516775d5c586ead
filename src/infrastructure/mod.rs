//! Infrastructure layer - External service implementations

pub mod cache;
pub mod catalog;
pub mod http;
pub mod llm;
pub mod logging;
pub mod services;
