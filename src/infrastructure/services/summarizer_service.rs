//! Review summarization service

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::catalog::Review;
use crate::domain::llm::{FinishReason, LlmProvider};
use crate::domain::summary::{parser, prompt, version_tag, Summary};
use crate::domain::{DomainError, ErrorKind, RetryPolicy};

/// Default Gemini model for summaries
pub const DEFAULT_SUMMARY_MODEL: &str = "gemini-2.5-flash-lite";

/// Word-count expectations for the one-sentence summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthPolicy {
    pub target_words: usize,
    pub acceptable_min: usize,
    pub acceptable_max: usize,
    /// Below this a second answer is requested
    pub reask_below: usize,
    /// Above this a second answer is requested
    pub reask_above: usize,
}

impl Default for LengthPolicy {
    fn default() -> Self {
        Self {
            target_words: 10,
            acceptable_min: 8,
            acceptable_max: 12,
            reask_below: 6,
            reask_above: 16,
        }
    }
}

impl LengthPolicy {
    pub fn needs_reask(&self, words: usize) -> bool {
        words < self.reask_below || words > self.reask_above
    }

    fn distance(&self, words: usize) -> usize {
        words.abs_diff(self.target_words)
    }

    fn reask_instruction(&self) -> String {
        format!(
            "Rewrite the TL;DR as a fluent sentence of about {} words \
             (acceptable range {}-{}). Only return the JSON.",
            self.target_words, self.acceptable_min, self.acceptable_max
        )
    }
}

/// Configuration for the summarizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    pub model: String,
    pub retry: RetryPolicy,
    pub length: LengthPolicy,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SUMMARY_MODEL.to_string(),
            retry: RetryPolicy::new(3).with_initial_delay(800),
            length: LengthPolicy::default(),
        }
    }
}

enum AttemptError {
    Transient(DomainError),
    Fatal(DomainError),
}

/// Turns an ordered review set into a validated [`Summary`]
#[derive(Debug)]
pub struct SummarizerService {
    provider: Arc<dyn LlmProvider>,
    config: SummarizerConfig,
}

impl SummarizerService {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_config(provider, SummarizerConfig::default())
    }

    pub fn with_config(provider: Arc<dyn LlmProvider>, config: SummarizerConfig) -> Self {
        Self { provider, config }
    }

    /// Tag identifying the model and prompt template, part of every cache key
    pub fn version_tag(&self) -> String {
        version_tag(&self.config.model)
    }

    /// Summarizes `reviews`, retrying transient failures.
    ///
    /// Transport errors, rate limiting, server faults and unparseable model
    /// output are retried up to the configured attempt count. Rejections such
    /// as an invalid API key fail immediately.
    pub async fn summarize(&self, reviews: &[Review]) -> Result<Summary, DomainError> {
        if reviews.is_empty() {
            return Err(DomainError::invalid_argument(
                "At least one review is required for a summary",
            ));
        }

        let first = self.summarize_with_retry(reviews).await?;
        let words = first.word_count();
        let length = &self.config.length;

        if !length.needs_reask(words) {
            return Ok(first);
        }

        info!(words, target = length.target_words, "Summary length off target, asking again");

        match self.attempt(reviews, Some(&length.reask_instruction())).await {
            Ok(second) if length.distance(second.word_count()) < length.distance(words) => {
                debug!(words = second.word_count(), "Keeping second summary");
                Summary::new(first.sentiment, second.tldr)
            }
            Ok(_) => Ok(first),
            Err(AttemptError::Transient(e)) | Err(AttemptError::Fatal(e)) => {
                warn!(error = %e, "Second summary request failed, keeping the first answer");
                Ok(first)
            }
        }
    }

    async fn summarize_with_retry(&self, reviews: &[Review]) -> Result<Summary, DomainError> {
        let policy = &self.config.retry;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match self.attempt(reviews, None).await {
                Ok(summary) => return Ok(summary),
                Err(AttemptError::Transient(e)) if policy.allows_another(attempt) => {
                    let delay = policy.delay_for_retry(attempt - 1);
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Summary attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(AttemptError::Transient(e)) => {
                    return Err(DomainError::summarization(format!(
                        "gave up after {} attempt(s): {}",
                        attempt, e
                    )));
                }
                Err(AttemptError::Fatal(e)) => return Err(e),
            }
        }
    }

    async fn attempt(
        &self,
        reviews: &[Review],
        extra_instruction: Option<&str>,
    ) -> Result<Summary, AttemptError> {
        let request = prompt::build_request(reviews, extra_instruction);

        let response = self
            .provider
            .chat(&self.config.model, request)
            .await
            .map_err(classify)?;

        debug!(
            provider = self.provider.provider_name(),
            model = %response.model,
            finish_reason = ?response.finish_reason,
            total_tokens = response.usage.as_ref().map(|u| u.total_tokens),
            "Model replied"
        );

        parser::parse_summary(response.content()).map_err(|e| {
            if response.finish_reason == Some(FinishReason::Length) {
                AttemptError::Transient(DomainError::summarization(format!(
                    "Model reply was cut off at the token limit ({})",
                    e
                )))
            } else {
                AttemptError::Transient(e)
            }
        })
    }
}

fn classify(error: DomainError) -> AttemptError {
    match error.kind() {
        ErrorKind::UpstreamUnavailable | ErrorKind::MalformedResponse => {
            AttemptError::Transient(error)
        }
        ErrorKind::Configuration | ErrorKind::Summarization => AttemptError::Fatal(error),
        _ => AttemptError::Fatal(DomainError::summarization(error.to_string())),
    }
}
