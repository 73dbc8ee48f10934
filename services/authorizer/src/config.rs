//! Type-Safe Configuration with Validation
//!
//! Provides type-safe configuration with URL validation and environment variable support.

use crate::error::ErrorVerbosity;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid URL format
    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl {
        /// Variable holding the URL
        field: String,
        /// Parser message
        reason: String,
    },

    /// Invalid TTL value
    #[error("Invalid TTL: must be greater than 0")]
    InvalidTtl,

    /// Invalid timeout value
    #[error("Invalid timeout for {0}: must be greater than 0")]
    InvalidTimeout(String),

    /// Missing required field
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    /// Environment variable parse error
    #[error("Failed to parse environment variable {name}: {reason}")]
    ParseError {
        /// Variable name
        name: String,
        /// Parser message
        reason: String,
    },
}

/// Service configuration with validation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase project id, the expected token audience
    pub project_id: String,
    /// Realtime database URL, reported when the provider starts
    pub database_url: Option<Url>,
    /// Signing key set endpoint
    pub jwks_url: Url,
    /// Identity Toolkit base URL used for revocation lookups
    pub identity_toolkit_url: Url,
    /// Web API key for the Identity Toolkit
    pub api_key: Option<String>,
    /// Ask the provider whether the session was revoked
    pub check_revoked: bool,
    /// Fallback JWKS cache TTL in seconds when the response carries no max-age
    pub jwks_cache_ttl_seconds: u64,
    /// Upper bound on a whole verification, in milliseconds
    pub verify_timeout_ms: u64,
    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,
    /// Attach verified claims to the response context
    pub attach_debug_context: bool,
    /// Rejection message detail
    pub error_verbosity: ErrorVerbosity,
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Config {
    /// Loads configuration from environment variables with validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = lookup("FIREBASE_PROJECT_ID")
            .or_else(|| lookup("GOOGLE_CLOUD_PROJECT"))
            .map(|p| p.trim().to_string())
            .unwrap_or_default();

        let database_url = match lookup("FIREBASE_DATABASE_URL") {
            Some(raw) => Some(parse_url("FIREBASE_DATABASE_URL", &raw)?),
            None => None,
        };

        let config = Self {
            project_id,
            database_url,
            jwks_url: parse_url_var(&lookup, "FIREBASE_JWKS_URL", DEFAULT_JWKS_URL)?,
            identity_toolkit_url: parse_url_var(
                &lookup,
                "IDENTITY_TOOLKIT_URL",
                DEFAULT_IDENTITY_TOOLKIT_URL,
            )?,
            api_key: lookup("FIREBASE_API_KEY").filter(|k| !k.trim().is_empty()),
            check_revoked: parse_var(&lookup, "CHECK_REVOKED", true)?,
            jwks_cache_ttl_seconds: parse_var(&lookup, "JWKS_CACHE_TTL", 3600)?,
            verify_timeout_ms: parse_var(&lookup, "VERIFY_TIMEOUT_MS", 3000)?,
            http_timeout_secs: parse_var(&lookup, "HTTP_TIMEOUT_SECS", 5)?,
            attach_debug_context: parse_var(&lookup, "ATTACH_DEBUG_CONTEXT", false)?,
            error_verbosity: parse_var(&lookup, "ERROR_VERBOSITY", ErrorVerbosity::Coarse)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: parse_var(&lookup, "LOG_JSON", true)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.is_empty() {
            return Err(ConfigError::MissingRequired("FIREBASE_PROJECT_ID".to_string()));
        }
        if self.jwks_cache_ttl_seconds == 0 {
            return Err(ConfigError::InvalidTtl);
        }
        if self.verify_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout("VERIFY_TIMEOUT_MS".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("HTTP_TIMEOUT_SECS".to_string()));
        }
        if self.check_revoked && self.api_key.is_none() {
            return Err(ConfigError::MissingRequired(
                "FIREBASE_API_KEY (required when CHECK_REVOKED=true)".to_string(),
            ));
        }
        Ok(())
    }

    /// Verification timeout as a duration.
    #[must_use]
    pub const fn verify_timeout(&self) -> Duration {
        Duration::from_millis(self.verify_timeout_ms)
    }

    /// HTTP request timeout as a duration.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Fallback JWKS cache TTL as a duration.
    #[must_use]
    pub const fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_cache_ttl_seconds)
    }
}

/// Parse a variable with a default value.
fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(val) => val.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            name: name.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

/// Parse a URL variable with a default value.
fn parse_url_var<F>(lookup: &F, name: &str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name).unwrap_or_else(|| default.to_string());
    parse_url(name, &raw)
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        field: name.to_string(),
        reason: e.to_string(),
    })
}
