//! Property tests for bearer header parsing.

use super::generators::{arb_bearer_scheme, arb_blank, arb_other_scheme, arb_token};
use authorizer::bearer::{extract_bearer_token, token_fingerprint};
use authorizer::ErrorCode;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any casing of the scheme yields the token exactly as presented.
    #[test]
    fn bearer_token_is_extracted(scheme in arb_bearer_scheme(), token in arb_token()) {
        let header = format!("{scheme} {token}");
        prop_assert_eq!(extract_bearer_token(Some(&header)).unwrap(), token.as_str());
    }

    /// Whitespace around or inside the token makes the header malformed.
    #[test]
    fn padded_token_is_malformed(
        scheme in arb_bearer_scheme(),
        token in arb_token(),
        leading in arb_blank(),
        trailing in arb_blank(),
    ) {
        prop_assume!(!leading.is_empty() || !trailing.is_empty());
        let header = format!("{scheme} {leading}{token}{trailing}");
        let err = extract_bearer_token(Some(&header)).unwrap_err();
        prop_assert_eq!(err.code(), ErrorCode::TokenMalformed);
    }

    /// A blank credential is malformed, never missing and never accepted.
    #[test]
    fn blank_credential_is_malformed(scheme in arb_bearer_scheme(), blank in arb_blank()) {
        let header = format!("{scheme} {blank}");
        let err = extract_bearer_token(Some(&header)).unwrap_err();
        prop_assert_eq!(err.code(), ErrorCode::TokenMalformed);
    }

    /// Other schemes are rejected as malformed.
    #[test]
    fn other_schemes_are_malformed(scheme in arb_other_scheme(), token in arb_token()) {
        let header = format!("{scheme} {token}");
        let err = extract_bearer_token(Some(&header)).unwrap_err();
        prop_assert_eq!(err.code(), ErrorCode::TokenMalformed);
    }

    /// Fingerprints never contain the token they identify.
    #[test]
    fn fingerprint_does_not_leak_token(token in "[A-Za-z0-9._-]{17,200}") {
        let fingerprint = token_fingerprint(&token);
        prop_assert_eq!(fingerprint.len(), 16);
        prop_assert!(!fingerprint.contains(&token));
    }
}
