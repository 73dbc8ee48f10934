//! Decision and Verification Metrics
//!
//! Outcome labels keep provider outages apart from rejected tokens, which
//! the caller-facing response deliberately does not.

use prometheus::{CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::time::Duration;

use crate::authorizer::Decision;

/// Authorizer metrics
pub struct AuthorizerMetrics {
    /// Decisions by outcome and deny reason
    pub decisions: CounterVec,
    /// Time spent in provider verification
    pub verification_latency: Histogram,
    registry: Registry,
}

impl AuthorizerMetrics {
    /// Creates new authorizer metrics registered on `registry`
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let decisions = CounterVec::new(
            Opts::new("decisions_total", "Total authorization decisions").namespace("authorizer"),
            &["outcome", "reason"],
        )?;
        registry.register(Box::new(decisions.clone()))?;

        let verification_latency = Histogram::with_opts(
            HistogramOpts::new(
                "verification_duration_seconds",
                "Identity provider verification latency in seconds",
            )
            .namespace("authorizer")
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;
        registry.register(Box::new(verification_latency.clone()))?;

        Ok(Self {
            decisions,
            verification_latency,
            registry: registry.clone(),
        })
    }

    /// Records a decision
    pub fn record_decision(&self, decision: &Decision) {
        let (outcome, reason) = match decision {
            Decision::Allow { .. } => ("allow", "none"),
            Decision::Deny(reason) => ("deny", reason.as_str()),
        };
        self.decisions.with_label_values(&[outcome, reason]).inc();
    }

    /// Records how long a provider verification took
    pub fn observe_verification(&self, elapsed: Duration) {
        self.verification_latency.observe(elapsed.as_secs_f64());
    }

    /// Renders the registry in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DenyReason;

    #[test]
    fn test_decisions_are_labelled_by_reason() {
        let metrics = AuthorizerMetrics::new(&Registry::new()).unwrap();

        metrics.record_decision(&Decision::Deny(DenyReason::ProviderUnavailable));
        metrics.record_decision(&Decision::Deny(DenyReason::VerificationFailed));
        metrics.record_decision(&Decision::Deny(DenyReason::VerificationFailed));
        metrics.record_decision(&Decision::Allow {
            principal_id: "user-42".to_string(),
            resource: "arn".to_string(),
            context: None,
        });

        let get = |outcome: &str, reason: &str| {
            metrics.decisions.with_label_values(&[outcome, reason]).get()
        };
        assert!((get("deny", "PROVIDER_UNAVAILABLE") - 1.0).abs() < f64::EPSILON);
        assert!((get("deny", "VERIFICATION_FAILED") - 2.0).abs() < f64::EPSILON);
        assert!((get("allow", "none") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_render_contains_namespace() {
        let metrics = AuthorizerMetrics::new(&Registry::new()).unwrap();
        metrics.observe_verification(Duration::from_millis(40));
        metrics.record_decision(&Decision::Deny(DenyReason::MissingToken));

        let text = metrics.render().unwrap();
        assert!(text.contains("authorizer_decisions_total"));
        assert!(text.contains("authorizer_verification_duration_seconds"));
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        assert!(AuthorizerMetrics::new(&registry).is_ok());
        assert!(AuthorizerMetrics::new(&registry).is_err());
    }
}
