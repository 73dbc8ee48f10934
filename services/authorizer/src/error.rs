//! Error handling module with type-safe, non-exhaustive error types
//!
//! Every failure the authorizer can hit is an [`AuthorizerError`]. Errors
//! carry full detail for server-side logs; callers only ever see the coarse
//! [`DenyReason`] derived from them.

use chrono::{DateTime, Utc};
use rust_common::PlatformError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Non-exhaustive error enum for forward compatibility
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AuthorizerError {
    /// No authorization material was supplied
    #[error("Authorization token missing")]
    TokenMissing,

    /// Authorization header is not a well-formed bearer credential
    #[error("Authorization token malformed: {reason}")]
    TokenMalformed {
        /// Description of the malformation
        reason: String,
    },

    /// Identity provider rejected the token
    #[error("Token rejected: {reason}")]
    TokenInvalid {
        /// Why the token was rejected
        reason: String,
    },

    /// Token has expired
    #[error("Token expired at {expired_at}")]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },

    /// Session behind the token was revoked after the token was issued
    #[error("Token revoked")]
    TokenRevoked,

    /// Account behind the token is disabled
    #[error("User account disabled")]
    UserDisabled,

    /// Identity provider could not be reached or answered with a fault
    #[error("Identity provider {service} unavailable: {reason}")]
    ProviderUnavailable {
        /// Which provider endpoint failed
        service: String,
        /// Description of the failure
        reason: String,
    },

    /// Verification did not finish in time
    #[error("Verification timed out after {duration:?}")]
    Timeout {
        /// How long verification ran before timing out
        duration: Duration,
    },

    /// Shared infrastructure could not be set up
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Internal error
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Stable error codes for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// `AUTH_TOKEN_MISSING`
    TokenMissing,
    /// `AUTH_TOKEN_MALFORMED`
    TokenMalformed,
    /// `AUTH_TOKEN_INVALID`
    TokenInvalid,
    /// `AUTH_TOKEN_EXPIRED`
    TokenExpired,
    /// `AUTH_TOKEN_REVOKED`
    TokenRevoked,
    /// `AUTH_USER_DISABLED`
    UserDisabled,
    /// `PROVIDER_UNAVAILABLE`
    ProviderUnavailable,
    /// `TIMEOUT`
    Timeout,
    /// `INTERNAL_ERROR`
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TokenMissing => "AUTH_TOKEN_MISSING",
            Self::TokenMalformed => "AUTH_TOKEN_MALFORMED",
            Self::TokenInvalid => "AUTH_TOKEN_INVALID",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::TokenRevoked => "AUTH_TOKEN_REVOKED",
            Self::UserDisabled => "AUTH_USER_DISABLED",
            Self::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-visible category of a denied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No authorization material supplied
    MissingToken,
    /// Present but not a well-formed bearer credential
    MalformedToken,
    /// Provider rejected the token, or verification failed unexpectedly
    VerificationFailed,
    /// Provider could not be reached in time
    ProviderUnavailable,
}

impl DenyReason {
    /// Stable label used in logs and metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::MalformedToken => "MALFORMED_TOKEN",
            Self::VerificationFailed => "VERIFICATION_FAILED",
            Self::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
        }
    }

    /// Message handed back to the caller.
    ///
    /// Provider outages and rejected tokens share a message so callers
    /// cannot probe provider health.
    pub const fn message(&self, verbosity: ErrorVerbosity) -> &'static str {
        match verbosity {
            ErrorVerbosity::Coarse => "Unauthorized",
            ErrorVerbosity::Descriptive => match self {
                Self::MissingToken => "Missing authorization token.",
                Self::MalformedToken => "Malformed authorization token.",
                Self::VerificationFailed | Self::ProviderUnavailable => {
                    "There are some issues with your auth token."
                }
            },
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a rejection message tells the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorVerbosity {
    /// A single `Unauthorized` message for every failure
    #[default]
    Coarse,
    /// One message per deny category
    Descriptive,
}

impl FromStr for ErrorVerbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coarse" => Ok(Self::Coarse),
            "descriptive" => Ok(Self::Descriptive),
            other => Err(format!("unknown error verbosity '{other}', expected coarse or descriptive")),
        }
    }
}

impl AuthorizerError {
    /// Create a malformed-token error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::TokenMalformed {
            reason: reason.into(),
        }
    }

    /// Create an invalid-token error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::TokenInvalid {
            reason: reason.into(),
        }
    }

    /// Create a provider-unavailable error.
    pub fn unavailable(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TokenMissing => ErrorCode::TokenMissing,
            Self::TokenMalformed { .. } => ErrorCode::TokenMalformed,
            Self::TokenInvalid { .. } => ErrorCode::TokenInvalid,
            Self::TokenExpired { .. } => ErrorCode::TokenExpired,
            Self::TokenRevoked => ErrorCode::TokenRevoked,
            Self::UserDisabled => ErrorCode::UserDisabled,
            Self::ProviderUnavailable { .. } => ErrorCode::ProviderUnavailable,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::Platform(_) | Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Coarse category handed to the caller.
    pub const fn deny_reason(&self) -> DenyReason {
        match self {
            Self::TokenMissing => DenyReason::MissingToken,
            Self::TokenMalformed { .. } => DenyReason::MalformedToken,
            Self::ProviderUnavailable { .. } | Self::Timeout { .. } => {
                DenyReason::ProviderUnavailable
            }
            Self::TokenInvalid { .. }
            | Self::TokenExpired { .. }
            | Self::TokenRevoked
            | Self::UserDisabled
            | Self::Platform(_)
            | Self::Internal(_) => DenyReason::VerificationFailed,
        }
    }
}

// ============================================================================
// From trait implementations for automatic error conversion
// ============================================================================

impl From<jsonwebtoken::errors::Error> for AuthorizerError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired {
                expired_at: Utc::now(),
            },
            ErrorKind::InvalidSignature => Self::invalid("signature verification failed"),
            ErrorKind::InvalidAudience => Self::invalid("unexpected audience"),
            ErrorKind::InvalidIssuer => Self::invalid("unexpected issuer"),
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::invalid("unsupported signing algorithm"),
            ErrorKind::MissingRequiredClaim(claim) => {
                Self::invalid(format!("missing required claim {claim}"))
            }
            _ => Self::invalid(format!("undecodable token: {err}")),
        }
    }
}

impl From<reqwest::Error> for AuthorizerError {
    fn from(err: reqwest::Error) -> Self {
        let service = err
            .url()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "identity-provider".to_string());

        if err.is_timeout() {
            Self::unavailable(service, "request timed out")
        } else if err.is_connect() {
            Self::unavailable(service, "connection failed")
        } else if err.is_decode() {
            Self::unavailable(service, format!("unexpected response body: {err}"))
        } else {
            Self::unavailable(service, err.to_string())
        }
    }
}
