use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for LLM providers
///
/// Implementations map transient failures (transport errors, 429, 5xx) to
/// `DomainError::UpstreamUnavailable` and unparseable bodies to
/// `DomainError::MalformedResponse`, so callers can decide what to retry.
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a single (non-streaming) generation request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
