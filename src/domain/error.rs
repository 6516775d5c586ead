use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Upstream unavailable after {attempts} attempt(s): {last_error}")]
    UpstreamUnavailable { attempts: u32, last_error: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Summarization error: {message}")]
    Summarization { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

/// Fieldless classification of a [`DomainError`], used to pick exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    UpstreamUnavailable,
    MalformedResponse,
    Summarization,
    Configuration,
    Storage,
}

impl DomainError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn upstream_unavailable(attempts: u32, last_error: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            attempts,
            last_error: last_error.into(),
        }
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn summarization(message: impl Into<String>) -> Self {
        Self::Summarization {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Summarization { .. } => ErrorKind::Summarization,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }
}
