//! Common error types for Tunewright

use thiserror::Error;

/// Common result type for Tunewright operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Tunewright services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found (unknown or expired session, unresolved seed)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An upstream service failed, timed out, or exhausted its rate quota.
    /// Fatal for the current operation; retryable by the caller.
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Upstream(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_is_retryable() {
        assert!(Error::Upstream("radio timeout".into()).is_retryable());
        assert!(!Error::NotFound("session".into()).is_retryable());
        assert!(!Error::InvalidInput("no seeds".into()).is_retryable());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::NotFound("session 123".into());
        assert_eq!(err.to_string(), "Not found: session 123");

        let err = Error::Upstream("lb-radio 503".into());
        assert_eq!(err.to_string(), "Upstream service error: lb-radio 503");
    }
}
