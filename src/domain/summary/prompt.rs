//! Prompt construction for review summaries

use crate::domain::catalog::Review;
use crate::domain::llm::LlmRequest;

/// Bumped whenever the prompt template changes, so cached summaries
/// produced by an older template are not reused.
pub const PROMPT_VERSION: &str = "v1";

const SYSTEM_PROMPT: &str = "You summarise Steam game reviews.\n\
Return EXACTLY this JSON wrapped in triple backticks:\n\
```json\n\
{\"sentiment\":\"pos|neg|mixed\",\"tldr\":\"10-word fluent sentence\"}\n\
```\n\
Rules:\n\
- tldr must be a natural sentence of exactly 10 words.\n\
- Count words (tokens separated by spaces), not characters.\n\
- sentiment must be one of: pos, neg, mixed (lowercase).\n\
- Do not include any commentary outside the JSON fences.";

const MAX_OUTPUT_TOKENS: u32 = 256;

/// Cache version tag for a model and the current prompt template
pub fn version_tag(model: &str) -> String {
    format!("{}:{}", model, PROMPT_VERSION)
}

/// Review text block, numbered in the order given
pub fn render_reviews(reviews: &[Review]) -> String {
    reviews
        .iter()
        .enumerate()
        .map(|(i, review)| format!("Review {}:\n{}", i + 1, review.body().trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the deterministic generation request for a review set
pub fn build_request(reviews: &[Review], extra_instruction: Option<&str>) -> LlmRequest {
    let mut system = SYSTEM_PROMPT.to_string();
    if let Some(extra) = extra_instruction {
        system.push_str("\n\n");
        system.push_str(extra);
    }

    LlmRequest::builder()
        .system(system)
        .user(render_reviews(reviews))
        .temperature(0.0)
        .top_p(0.0)
        .top_k(1)
        .max_tokens(MAX_OUTPUT_TOKENS)
        .build()
}
