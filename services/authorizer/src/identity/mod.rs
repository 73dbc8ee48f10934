//! Identity provider seam.
//!
//! The decision function only needs `verify_token`; everything about how a
//! token is checked lives behind [`IdentityProvider`].

pub mod claims;
pub mod firebase;
pub mod handle;
pub mod jwk_cache;
pub mod revocation;
pub mod token;

use crate::error::AuthorizerError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub use claims::FirebaseClaims;
pub use firebase::FirebaseAuth;
pub use handle::{ProviderCell, shared_firebase_auth};
pub use jwk_cache::JwkCache;
pub use revocation::RevocationChecker;
pub use token::{SignatureValidated, Token, TokenExpectations, TokenState, Unvalidated, Validated};

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    /// Stable subject identifier
    pub sub: String,
    /// Every claim the provider reported, `sub` included
    pub claims: Map<String, Value>,
}

impl VerifiedIdentity {
    /// Identity with no claims beyond the subject.
    pub fn from_subject(sub: impl Into<String>) -> Self {
        let sub = sub.into();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), Value::String(sub.clone()));
        Self { sub, claims }
    }
}

impl From<FirebaseClaims> for VerifiedIdentity {
    fn from(claims: FirebaseClaims) -> Self {
        Self {
            claims: claims.to_map(),
            sub: claims.sub,
        }
    }
}

/// Verifies bearer tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies `token`; with `check_revoked` the provider must also reject
    /// tokens whose session has been revoked.
    async fn verify_token(
        &self,
        token: &str,
        check_revoked: bool,
    ) -> Result<VerifiedIdentity, AuthorizerError>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for Arc<T> {
    async fn verify_token(
        &self,
        token: &str,
        check_revoked: bool,
    ) -> Result<VerifiedIdentity, AuthorizerError> {
        (**self).verify_token(token, check_revoked).await
    }
}
