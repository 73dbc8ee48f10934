//! Bearer credential extraction.

use crate::error::AuthorizerError;
use sha2::{Digest, Sha256};
use std::fmt::Write;

/// Scheme accepted in the authorization header, compared case-insensitively.
pub const BEARER_SCHEME: &str = "bearer";

/// Extracts the token from a `"<scheme> <token>"` authorization value.
///
/// The value is split on its first space and the remainder is the token,
/// unchanged. A remainder that is empty or contains whitespace is malformed,
/// so `"Bearer  abc123"` and `"Bearer abc123 "` are both rejected.
pub fn extract_bearer_token(raw_header: Option<&str>) -> Result<&str, AuthorizerError> {
    let raw = match raw_header {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(AuthorizerError::TokenMissing),
    };

    let (scheme, token) = raw
        .split_once(' ')
        .ok_or_else(|| AuthorizerError::malformed("expected '<scheme> <token>'"))?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthorizerError::malformed("unsupported authorization scheme"));
    }

    if token.is_empty() {
        return Err(AuthorizerError::malformed("empty bearer token"));
    }
    if token.chars().any(char::is_whitespace) {
        return Err(AuthorizerError::malformed("whitespace in bearer token"));
    }

    Ok(token)
}

/// Short, non-reversible identifier for a token, safe to put in logs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().take(8).fold(String::with_capacity(16), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}
