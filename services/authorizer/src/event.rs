//! Inbound invocation shape.

use serde::{Deserialize, Serialize};

/// Token authorizer request as delivered by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    /// Authorizer type, `TOKEN` for header-based authorizers
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Raw authorization header value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_token: Option<String>,
    /// Resource being invoked
    pub method_arn: String,
}

impl AuthorizerRequest {
    /// Token request for `method_arn` with the given header value.
    pub fn new(authorization_token: Option<&str>, method_arn: impl Into<String>) -> Self {
        Self {
            kind: Some("TOKEN".to_string()),
            authorization_token: authorization_token.map(str::to_string),
            method_arn: method_arn.into(),
        }
    }
}
