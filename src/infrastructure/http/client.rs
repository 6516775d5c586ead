use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::retry::is_retryable_status;
use crate::domain::DomainError;

const USER_AGENT: &str = concat!("review-snapshot/", env!("CARGO_PKG_VERSION"));

/// Network-level failure: nothing usable came back from the server
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// How a response status should be treated by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    /// Rate limited or server fault; worth another attempt
    Retryable,
    /// The requested resource does not exist
    NotFound,
    /// Any other client error; retrying cannot help
    Rejected,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn class(&self) -> StatusClass {
        match self.status {
            200..=299 => StatusClass::Success,
            404 | 410 => StatusClass::NotFound,
            s if is_retryable_status(s) => StatusClass::Retryable,
            _ => StatusClass::Rejected,
        }
    }

    /// Short description for error messages and logs
    pub fn describe(&self) -> String {
        const MAX_BODY: usize = 200;

        let body = self.body.trim();
        if body.is_empty() {
            return format!("HTTP {}", self.status);
        }

        let snippet: String = body.chars().take(MAX_BODY).collect();
        format!("HTTP {}: {}", self.status, snippet)
    }
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: Vec<(&str, &str)>,
    ) -> Result<HttpResponse, TransportError>;

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Builds a client whose every request is bounded by `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, TransportError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::new(format!("Request timed out: {}", error))
    } else {
        TransportError::new(format!("Request failed: {}", error))
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: Vec<(&str, &str)>,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.get(url).query(query);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        self.send(request).await
    }

    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        self.send(request.json(body)).await
    }
}
