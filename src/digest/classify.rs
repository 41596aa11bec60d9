//! Classification of failed HTTP responses into human-readable categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a non-success HTTP response.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// 400.
    BadRequest,
    /// 404.
    NotFound,
    /// 405.
    MethodNotAllowed,
    /// 500.
    InternalServerError,
    /// 503.
    ServiceUnavailable,
    /// Any other status code.
    Unknown,
}

impl ErrorCategory {
    /// Map a status code to its category. Total over all codes.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            500 => Self::InternalServerError,
            503 => Self::ServiceUnavailable,
            _ => Self::Unknown,
        }
    }

    /// Human-readable message for the category.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::NotFound => "Not found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::InternalServerError => "Internal server error",
            Self::ServiceUnavailable => "Service unavailable",
            Self::Unknown => "Unknown error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Classify a failed response and report it to the log sink.
pub fn surface_error(status: u16) -> ErrorCategory {
    let category = ErrorCategory::from_status(status);
    tracing::warn!(status, category = %category, "request failed");
    category
}
