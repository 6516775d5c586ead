//! Parsing of structured model output

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{Sentiment, Summary};
use crate::domain::DomainError;

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)```(?:json)?\s*(\{.*?\})\s*```").expect("code fence regex is valid")
});

static OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("object regex is valid"));

#[derive(Debug, Deserialize)]
struct RawSummary {
    #[serde(default)]
    sentiment: Option<String>,
    #[serde(default)]
    tldr: Option<serde_json::Value>,
}

/// JSON object inside a fenced block, else the widest `{...}` span
pub fn extract_json(raw: &str) -> &str {
    if let Some(captures) = CODE_FENCE_RE.captures(raw) {
        if let Some(object) = captures.get(1) {
            return object.as_str().trim();
        }
    }

    OBJECT_RE
        .find(raw)
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| raw.trim())
}

/// Maps loose sentiment labels onto [`Sentiment`]
pub fn normalize_sentiment(label: &str) -> Sentiment {
    match label.trim().to_lowercase().as_str() {
        "pos" | "positive" | "good" | "\u{1F44D}" => Sentiment::Pos,
        "neg" | "negative" | "bad" | "\u{1F44E}" => Sentiment::Neg,
        _ => Sentiment::Mixed,
    }
}

/// Parses and validates a model reply into a [`Summary`]
pub fn parse_summary(raw: &str) -> Result<Summary, DomainError> {
    let json = extract_json(raw);

    let parsed: RawSummary = serde_json::from_str(json).map_err(|e| {
        DomainError::summarization(format!("Model output is not valid summary JSON: {}", e))
    })?;

    let tldr = match parsed.tldr {
        Some(serde_json::Value::String(text)) => text,
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let sentiment = normalize_sentiment(parsed.sentiment.as_deref().unwrap_or_default());

    Summary::new(sentiment, tldr)
}
