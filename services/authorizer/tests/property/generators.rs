//! Proptest Generators
//!
//! Shared generators for property-based tests.

use proptest::prelude::*;

/// Generates token-shaped strings without whitespace
pub fn arb_token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._~+/=-]{1,200}"
}

/// Generates the bearer scheme in arbitrary letter case
pub fn arb_bearer_scheme() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), 6).prop_map(|upper| {
        "bearer"
            .chars()
            .zip(upper)
            .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
            .collect()
    })
}

/// Generates schemes other than bearer
pub fn arb_other_scheme() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Basic".to_string()),
        Just("Digest".to_string()),
        Just("Token".to_string()),
        Just("Bearer:".to_string()),
        "[A-Za-z]{1,12}".prop_filter("not bearer", |s| !s.eq_ignore_ascii_case("bearer")),
    ]
}

/// Generates whitespace-only runs, possibly empty
pub fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t]{0,8}"
}

/// Generates gateway method ARNs
pub fn arb_method_arn() -> impl Strategy<Value = String> {
    (
        "[a-z]{2}-[a-z]{4,9}-[1-3]",
        "[0-9]{12}",
        "[a-z0-9]{10}",
        prop_oneof![Just("GET"), Just("POST"), Just("PUT"), Just("DELETE")],
        "[a-z0-9/]{0,30}",
    )
        .prop_map(|(region, account, api, verb, path)| {
            format!("arn:aws:execute-api:{region}:{account}:{api}/prod/{verb}/{path}")
        })
}
