//! Property tests for the decision function.

use super::generators::{arb_method_arn, arb_other_scheme, arb_token};
use crate::common::{FakeProvider, PanickingProvider};
use authorizer::{Authorizer, AuthorizerSettings, Decision, DenyReason, Effect, ErrorVerbosity};
use proptest::prelude::*;
use std::sync::atomic::Ordering;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// An accepted token yields an allow scoped to exactly the requested resource.
    #[test]
    fn allow_is_scoped_to_requested_resource(token in arb_token(), arn in arb_method_arn()) {
        let authorizer = Authorizer::new(
            FakeProvider::accepting(&token, "user-42"),
            AuthorizerSettings::default(),
        );
        let header = format!("Bearer {token}");

        let decision = tokio_test::block_on(authorizer.decide(Some(&header), &arn));
        let response = decision.into_response(ErrorVerbosity::Coarse).unwrap();

        prop_assert_eq!(response.principal_id.as_deref(), Some("user-42"));
        let statements = &response.policy_document.statement;
        prop_assert_eq!(statements.len(), 1);
        prop_assert_eq!(statements[0].effect, Effect::Allow);
        prop_assert_eq!(&statements[0].resource, &arn);
    }

    /// The same input always produces the same decision.
    #[test]
    fn decide_is_deterministic(token in arb_token(), other in arb_token(), arn in arb_method_arn()) {
        let authorizer = Authorizer::new(
            FakeProvider::accepting(&token, "user-42"),
            AuthorizerSettings::default(),
        );
        let header = format!("Bearer {other}");

        let first = tokio_test::block_on(authorizer.decide(Some(&header), &arn));
        let second = tokio_test::block_on(authorizer.decide(Some(&header), &arn));
        prop_assert_eq!(first, second);
    }

    /// Non-bearer schemes are denied without consulting the provider.
    #[test]
    fn non_bearer_never_reaches_provider(scheme in arb_other_scheme(), token in arb_token()) {
        let provider = FakeProvider::accepting(&token, "user-42");
        let calls = provider.calls();
        let authorizer = Authorizer::new(provider, AuthorizerSettings::default());
        let header = format!("{scheme} {token}");

        let decision = tokio_test::block_on(authorizer.decide(Some(&header), "arn"));
        prop_assert_eq!(decision, Decision::Deny(DenyReason::MalformedToken));
        prop_assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// Every deny maps to a rejection, with one message under coarse verbosity.
    #[test]
    fn coarse_rejections_share_one_message(token in arb_token()) {
        let authorizer = Authorizer::new(PanickingProvider, AuthorizerSettings::default());
        let header = format!("Bearer {token}");

        let decision = tokio_test::block_on(authorizer.decide(Some(&header), "arn"));
        prop_assert_eq!(decision.deny_reason(), Some(DenyReason::VerificationFailed));

        let rejection = decision.into_response(ErrorVerbosity::Coarse).unwrap_err();
        prop_assert_eq!(rejection.message(), "Unauthorized");
    }
}
