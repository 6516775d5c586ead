//! Summary and report entities

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{CatalogEntry, Review};
use crate::domain::DomainError;

/// Overall tone of the summarised reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Pos,
    Neg,
    Mixed,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pos => "pos",
            Self::Neg => "neg",
            Self::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated model output for a set of reviews
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub sentiment: Sentiment,
    pub tldr: String,
}

impl Summary {
    /// Builds a summary, rejecting an empty `tldr`
    pub fn new(sentiment: Sentiment, tldr: impl Into<String>) -> Result<Self, DomainError> {
        let tldr = tldr.into().trim().to_string();

        if tldr.is_empty() {
            return Err(DomainError::summarization("Model returned an empty summary"));
        }

        Ok(Self { sentiment, tldr })
    }

    pub fn word_count(&self) -> usize {
        self.tldr.split_whitespace().count()
    }
}

/// Per-review outcome when summarising reviews one by one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub from_cache: bool,
}

impl ReviewSnapshot {
    pub fn summarised(review: &Review, summary: Summary, from_cache: bool) -> Self {
        Self {
            author: review.author().map(str::to_string),
            recommended: review.recommended(),
            summary: Some(summary),
            error: None,
            from_cache,
        }
    }

    pub fn failed(review: &Review, error: &DomainError) -> Self {
        Self {
            author: review.author().map(str::to_string),
            recommended: review.recommended(),
            summary: None,
            error: Some(error.to_string()),
            from_cache: false,
        }
    }
}

/// Result handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub entry: CatalogEntry,
    pub review_count: usize,
    /// Summary of the whole review set (aggregate mode, at least one review)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    pub from_cache: bool,
    /// One entry per review (per-review mode)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub snapshots: Vec<ReviewSnapshot>,
    /// Raw reviews, only when requested for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
}
