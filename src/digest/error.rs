//! Error types for the digest pipeline.

use thiserror::Error;

use super::classify::ErrorCategory;

/// Errors that can occur while building conversation summaries.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Caller passed a malformed value. Raised before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A timestamp could not be interpreted as a date.
    #[error("invalid string provided: {0}")]
    Parse(String),

    /// Server answered with a non-success status.
    #[error("{category} (HTTP {status})")]
    Transport {
        /// HTTP status code.
        status: u16,
        /// Classified category.
        category: ErrorCategory,
    },

    /// HTTP request failed at the network level.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body did not match the expected shape.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DigestError {
    /// Check if this error comes from a classified HTTP failure.
    #[must_use]
    pub const fn is_transport_failure(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status of a classified failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience result alias for digest operations.
pub type DigestResult<T> = Result<T, DigestError>;
