//! Error types for API operations

use reqwest::StatusCode;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any non-2xx, non-404 response
    #[error("API request failed with status {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("Response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A 2xx body did not match the expected shape
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request queue for route {0} is closed")]
    QueueClosed(String),

    #[error("Request on route {0} aborted unexpectedly")]
    Aborted(String),

    #[error("Unexpected upstream payload: {0}")]
    Transform(String),
}

impl ApiError {
    /// Check if error is retryable
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Upstream { .. } | Self::InvalidJson(_) => true,
            Self::Http(e) => !e.is_builder(),
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Mismatch;

    #[test]
    fn test_upstream_failures_are_retryable() {
        let err = ApiError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            message: "upstream timeout".to_string(),
        };
        assert!(err.should_retry());
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn test_schema_violations_are_not_retryable() {
        let err = ApiError::Validation(ValidationError::new(
            "player/:id",
            vec![Mismatch::new("$input.uid", "number")],
        ));
        assert!(!err.should_retry());
        assert!(!ApiError::Config("no keys".to_string()).should_retry());
        assert!(!ApiError::QueueClosed("v1:heroes".to_string()).should_retry());
    }
}
