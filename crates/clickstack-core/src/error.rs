//! Error types shared across the deployment layer

use thiserror::Error;

/// A configuration problem the caller can fix.
///
/// Raised when a pipeline configuration is malformed or internally
/// inconsistent; maps to a 4xx response and must never be retried.
/// Managed-service failures are deliberately NOT this type - they
/// propagate unchanged as `anyhow::Error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct BadRequestError {
    message: String,
}

impl BadRequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        400
    }
}

/// Result type alias for validation and parameter building
pub type Result<T> = std::result::Result<T, BadRequestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_formats_message() {
        let err = BadRequestError::new("ServerMax must be greater than or equal ServerMin");
        assert_eq!(
            err.to_string(),
            "ServerMax must be greater than or equal ServerMin"
        );
        assert_eq!(err.status_code(), 400);
    }
}
