//! Type-State ID Token with compile-time validation guarantees
//!
//! Claims are only reachable once both the signature and the Firebase
//! claim rules have been checked.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

use crate::error::AuthorizerError;
use crate::identity::claims::FirebaseClaims;
use crate::identity::jwk_cache::JwkCache;

/// Clock skew tolerated for `iat` and `auth_time`.
pub const CLOCK_SKEW_SECONDS: i64 = 5;

/// Longest subject Firebase issues, in bytes.
pub const MAX_SUBJECT_LEN: usize = 128;

// ============================================================================
// Sealed Trait Pattern for Token States
// ============================================================================

mod private {
    pub trait Sealed {}
}

/// Marker trait for token validation states
pub trait TokenState: private::Sealed {
    /// Human-readable state name for debugging
    fn state_name() -> &'static str;
}

/// Unvalidated token - header parsed, nothing verified
#[derive(Debug)]
pub struct Unvalidated;
impl private::Sealed for Unvalidated {}
impl TokenState for Unvalidated {
    fn state_name() -> &'static str {
        "Unvalidated"
    }
}

/// Signature validated - cryptographic verification passed
#[derive(Debug)]
pub struct SignatureValidated;
impl private::Sealed for SignatureValidated {}
impl TokenState for SignatureValidated {
    fn state_name() -> &'static str {
        "SignatureValidated"
    }
}

/// Fully validated - signature + claims verified
#[derive(Debug)]
pub struct Validated;
impl private::Sealed for Validated {}
impl TokenState for Validated {
    fn state_name() -> &'static str {
        "Validated"
    }
}

/// What a token must look like to be accepted for a project.
#[derive(Debug, Clone)]
pub struct TokenExpectations {
    /// Expected `aud`
    pub project_id: String,
    /// Expected `iss`
    pub issuer: String,
}

impl TokenExpectations {
    /// Expectations for Firebase ID tokens minted for `project_id`.
    pub fn for_project(project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        let issuer = format!("https://securetoken.google.com/{project_id}");
        Self { project_id, issuer }
    }
}

// ============================================================================
// Type-State Token Wrapper
// ============================================================================

/// Type-state token wrapper that enforces validation at compile time
#[derive(Debug)]
pub struct Token<State: TokenState> {
    raw: String,
    kid: String,
    claims: Option<FirebaseClaims>,
    _state: PhantomData<State>,
}

impl Token<Unvalidated> {
    /// Parse a raw ID token into an unvalidated token.
    ///
    /// Firebase signs ID tokens with RS256 and always names the key.
    pub fn parse(raw: &str) -> Result<Self, AuthorizerError> {
        let header = decode_header(raw)
            .map_err(|e| AuthorizerError::invalid(format!("invalid token header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(AuthorizerError::invalid(format!(
                "incorrect algorithm {:?}, expected RS256",
                header.alg
            )));
        }

        let kid = header
            .kid
            .filter(|kid| !kid.is_empty())
            .ok_or_else(|| AuthorizerError::invalid("missing kid in token header"))?;

        Ok(Self {
            raw: raw.to_string(),
            kid,
            claims: None,
            _state: PhantomData,
        })
    }

    /// Get the key ID from the token header
    pub fn kid(&self) -> &str {
        &self.kid
    }

    /// Validate the token signature using the JWK cache
    pub async fn validate_signature(
        self,
        cache: &JwkCache,
    ) -> Result<Token<SignatureValidated>, AuthorizerError> {
        let key = cache.get_key(&self.kid).await?;
        self.validate_signature_with_key(&key)
    }

    /// Validate signature with a specific decoding key
    pub fn validate_signature_with_key(
        self,
        key: &DecodingKey,
    ) -> Result<Token<SignatureValidated>, AuthorizerError> {
        // Signature only; the claim rules are checked in the next state
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let token_data = decode::<FirebaseClaims>(&self.raw, key, &validation)?;

        Ok(Token {
            raw: self.raw,
            kid: self.kid,
            claims: Some(token_data.claims),
            _state: PhantomData,
        })
    }
}

impl Token<SignatureValidated> {
    /// Validate claims and transition to fully validated state
    pub fn validate_claims(
        self,
        expected: &TokenExpectations,
    ) -> Result<Token<Validated>, AuthorizerError> {
        let claims = self
            .claims
            .as_ref()
            .ok_or_else(|| AuthorizerError::invalid("claims not available"))?;
        let now = Utc::now().timestamp();

        if claims.is_expired() {
            return Err(AuthorizerError::TokenExpired {
                expired_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
            });
        }
        if claims.iat > now + CLOCK_SKEW_SECONDS {
            return Err(AuthorizerError::invalid("token issued in the future"));
        }
        if claims.auth_time > now + CLOCK_SKEW_SECONDS {
            return Err(AuthorizerError::invalid("authentication time in the future"));
        }
        if claims.aud != expected.project_id {
            return Err(AuthorizerError::invalid(format!(
                "unexpected audience {}, expected {}",
                claims.aud, expected.project_id
            )));
        }
        if claims.iss != expected.issuer {
            return Err(AuthorizerError::invalid(format!(
                "unexpected issuer {}, expected {}",
                claims.iss, expected.issuer
            )));
        }
        if claims.sub.is_empty() {
            return Err(AuthorizerError::invalid("empty subject"));
        }
        if claims.sub.len() > MAX_SUBJECT_LEN {
            return Err(AuthorizerError::invalid("subject longer than 128 bytes"));
        }

        Ok(Token {
            raw: self.raw,
            kid: self.kid,
            claims: self.claims,
            _state: PhantomData,
        })
    }
}

impl Token<Validated> {
    /// Consume the token, yielding its claims
    pub fn into_claims(self) -> Result<FirebaseClaims, AuthorizerError> {
        self.claims
            .ok_or_else(|| AuthorizerError::invalid("validated token without claims"))
    }
}

// Common methods for all states
impl<S: TokenState> Token<S> {
    /// Get the current state name
    pub fn state_name(&self) -> &'static str {
        S::state_name()
    }
}
