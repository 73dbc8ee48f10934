//! Firebase Authentication ID token verification.

use crate::config::Config;
use crate::error::AuthorizerError;
use crate::identity::jwk_cache::JwkCache;
use crate::identity::revocation::RevocationChecker;
use crate::identity::token::{Token, TokenExpectations};
use crate::identity::{IdentityProvider, VerifiedIdentity};
use async_trait::async_trait;
use rust_common::{HttpConfig, build_http_client};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Verifies Firebase ID tokens: signature against the published key set,
/// claim rules for the project, and optionally revocation.
pub struct FirebaseAuth {
    expectations: TokenExpectations,
    jwk_cache: Arc<JwkCache>,
    revocation: Option<RevocationChecker>,
}

impl FirebaseAuth {
    /// Builds the provider from configuration.
    pub fn new(config: &Config) -> Result<Self, AuthorizerError> {
        let http_client = build_http_client(
            &HttpConfig::default()
                .with_timeout(config.http_timeout())
                .with_connect_timeout(config.http_timeout()),
        )?;

        let jwk_cache = Arc::new(JwkCache::new(
            config.jwks_url.clone(),
            config.jwks_cache_ttl(),
            http_client.clone(),
        ));

        let revocation = match &config.api_key {
            Some(api_key) => Some(RevocationChecker::new(
                &config.identity_toolkit_url,
                api_key.clone(),
                http_client,
            )?),
            None => None,
        };

        Ok(Self::from_parts(
            TokenExpectations::for_project(&config.project_id),
            jwk_cache,
            revocation,
        ))
    }

    /// Assembles the provider from already-built parts.
    pub const fn from_parts(
        expectations: TokenExpectations,
        jwk_cache: Arc<JwkCache>,
        revocation: Option<RevocationChecker>,
    ) -> Self {
        Self {
            expectations,
            jwk_cache,
            revocation,
        }
    }

    /// Signing key cache.
    pub fn jwk_cache(&self) -> &JwkCache {
        &self.jwk_cache
    }
}

#[async_trait]
impl IdentityProvider for FirebaseAuth {
    #[instrument(skip_all, fields(project_id = %self.expectations.project_id, check_revoked = check_revoked))]
    async fn verify_token(
        &self,
        token: &str,
        check_revoked: bool,
    ) -> Result<VerifiedIdentity, AuthorizerError> {
        let validated = Token::parse(token)?
            .validate_signature(&self.jwk_cache)
            .await?
            .validate_claims(&self.expectations)?;
        let claims = validated.into_claims()?;

        if check_revoked {
            let checker = self.revocation.as_ref().ok_or_else(|| {
                AuthorizerError::Internal(anyhow::anyhow!(
                    "revocation check requested but no Identity Toolkit API key is configured"
                ))
            })?;
            checker.check(token, &claims).await?;
        }

        debug!(sub = %claims.sub, "ID token verified");
        Ok(VerifiedIdentity::from(claims))
    }
}
