//! Error type for the shared infrastructure helpers.

use thiserror::Error;

/// Errors raised while setting up platform infrastructure.
///
/// These are start-up failures: a service that receives one cannot serve
/// requests and should report it to its operator.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Global tracing subscriber could not be installed
    #[error("Tracing initialization failed: {0}")]
    Tracing(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PlatformError {
    /// Create an invalid input error with the given message.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a tracing error with the given message.
    #[must_use]
    pub fn tracing(msg: impl Into<String>) -> Self {
        Self::Tracing(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlatformError::invalid_input("timeout must be greater than 0");
        assert_eq!(err.to_string(), "Invalid input: timeout must be greater than 0");

        let err = PlatformError::tracing("a global default trace dispatcher has already been set");
        assert!(err.to_string().starts_with("Tracing initialization failed"));
    }
}
