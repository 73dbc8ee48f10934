//! Token-to-policy decision function.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::bearer::{extract_bearer_token, token_fingerprint};
use crate::config::Config;
use crate::error::{AuthorizerError, DenyReason, ErrorVerbosity};
use crate::event::AuthorizerRequest;
use crate::identity::{IdentityProvider, VerifiedIdentity};
use crate::observability::AuthorizerMetrics;
use crate::policy::AuthorizerResponse;

/// Default bound on a single provider verification.
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(3);

/// Knobs that differ between deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizerSettings {
    /// Attach verified claims as response context instead of a principal id.
    /// Leaks token internals downstream; diagnostic deployments only.
    pub attach_debug_context: bool,
    /// Rejection message detail
    pub error_verbosity: ErrorVerbosity,
    /// Bound on the provider call
    pub verify_timeout: Duration,
    /// Ask the provider to reject revoked sessions
    pub check_revoked: bool,
}

impl Default for AuthorizerSettings {
    fn default() -> Self {
        Self {
            attach_debug_context: false,
            error_verbosity: ErrorVerbosity::Coarse,
            verify_timeout: DEFAULT_VERIFY_TIMEOUT,
            check_revoked: true,
        }
    }
}

impl From<&Config> for AuthorizerSettings {
    fn from(config: &Config) -> Self {
        Self {
            attach_debug_context: config.attach_debug_context,
            error_verbosity: config.error_verbosity,
            verify_timeout: config.verify_timeout(),
            check_revoked: config.check_revoked,
        }
    }
}

/// Access-control decision for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Caller may invoke `resource`
    Allow {
        /// Verified subject
        principal_id: String,
        /// Resource the decision covers
        resource: String,
        /// Flattened claims, debug deployments only
        context: Option<Map<String, Value>>,
    },
    /// Caller is refused
    Deny(DenyReason),
}

impl Decision {
    fn allow(identity: VerifiedIdentity, resource: &str, attach_context: bool) -> Self {
        let context = attach_context.then(|| flatten_context(&identity));
        Self::Allow {
            principal_id: identity.sub,
            resource: resource.to_string(),
            context,
        }
    }

    /// Whether the caller is allowed through.
    pub const fn is_allow(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    /// Deny category, if denied.
    pub const fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow { .. } => None,
            Self::Deny(reason) => Some(*reason),
        }
    }

    /// Shapes the decision for the gateway.
    pub fn into_response(self, verbosity: ErrorVerbosity) -> Result<AuthorizerResponse, Rejection> {
        match self {
            Self::Allow {
                principal_id,
                resource,
                context: None,
            } => Ok(AuthorizerResponse::allow(principal_id, resource)),
            Self::Allow {
                resource,
                context: Some(context),
                ..
            } => Ok(AuthorizerResponse::allow_with_context(resource, context)),
            Self::Deny(reason) => Err(Rejection::new(reason, verbosity)),
        }
    }
}

/// Opaque rejection handed back to the hosting transport.
///
/// The message is not a contract; transports map any rejection to a 401.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Rejection {
    reason: DenyReason,
    message: &'static str,
}

impl Rejection {
    /// Rejection for `reason` worded per `verbosity`.
    pub const fn new(reason: DenyReason, verbosity: ErrorVerbosity) -> Self {
        Self {
            reason,
            message: reason.message(verbosity),
        }
    }

    /// Deny category
    pub const fn reason(&self) -> DenyReason {
        self.reason
    }

    /// Message shown to the caller
    pub const fn message(&self) -> &'static str {
        self.message
    }
}

/// Request authorizer.
///
/// Holds no per-request state; one instance serves concurrent calls.
pub struct Authorizer<P> {
    provider: P,
    settings: AuthorizerSettings,
    metrics: Option<Arc<AuthorizerMetrics>>,
}

impl<P: IdentityProvider> Authorizer<P> {
    /// Creates an authorizer backed by `provider`.
    pub const fn new(provider: P, settings: AuthorizerSettings) -> Self {
        Self {
            provider,
            settings,
            metrics: None,
        }
    }

    /// Records decisions and verification latency on `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<AuthorizerMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Active settings.
    pub const fn settings(&self) -> &AuthorizerSettings {
        &self.settings
    }

    /// Decides whether the bearer of `raw_header` may invoke `resource`.
    ///
    /// Never fails: every error becomes a [`Decision::Deny`] after being
    /// logged in full.
    pub async fn decide(&self, raw_header: Option<&str>, resource: &str) -> Decision {
        let span = info_span!("decide", request_id = %Uuid::new_v4(), resource = %resource);

        async {
            let decision = match self.verify(raw_header).await {
                Ok(identity) => {
                    info!(principal_id = %identity.sub, "Access allowed");
                    Decision::allow(identity, resource, self.settings.attach_debug_context)
                }
                Err(err) => {
                    let reason = err.deny_reason();
                    warn!(
                        error = %err,
                        error_code = %err.code(),
                        deny_reason = %reason,
                        "Access denied"
                    );
                    Decision::Deny(reason)
                }
            };

            if let Some(metrics) = &self.metrics {
                metrics.record_decision(&decision);
            }
            decision
        }
        .instrument(span)
        .await
    }

    /// Runs [`Self::decide`] for a gateway request and shapes the result.
    pub async fn handle(&self, request: &AuthorizerRequest) -> Result<AuthorizerResponse, Rejection> {
        info!(
            kind = request.kind.as_deref().unwrap_or("TOKEN"),
            method_arn = %request.method_arn,
            has_token = request.authorization_token.is_some(),
            "Authorizer invoked"
        );

        self.decide(request.authorization_token.as_deref(), &request.method_arn)
            .await
            .into_response(self.settings.error_verbosity)
    }

    async fn verify(&self, raw_header: Option<&str>) -> Result<VerifiedIdentity, AuthorizerError> {
        let token = extract_bearer_token(raw_header)?;
        debug!(token_fingerprint = %token_fingerprint(token), "Verifying bearer token");

        let started = Instant::now();
        let verification = AssertUnwindSafe(
            self.provider
                .verify_token(token, self.settings.check_revoked),
        )
        .catch_unwind();
        let outcome = timeout(self.settings.verify_timeout, verification).await;

        if let Some(metrics) = &self.metrics {
            metrics.observe_verification(started.elapsed());
        }

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(_panic)) => Err(AuthorizerError::Internal(anyhow::anyhow!(
                "identity provider panicked during verification"
            ))),
            Err(_) => Err(AuthorizerError::Timeout {
                duration: self.settings.verify_timeout,
            }),
        }
    }
}

/// Claims reshaped for a gateway context map, which only carries scalars.
///
/// Nested values are JSON-encoded and nulls dropped.
fn flatten_context(identity: &VerifiedIdentity) -> Map<String, Value> {
    let mut context: Map<String, Value> = identity
        .claims
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
                scalar => scalar.clone(),
            };
            Some((key.clone(), value))
        })
        .collect();
    context.insert("sub".to_string(), Value::String(identity.sub.clone()));
    context
}
