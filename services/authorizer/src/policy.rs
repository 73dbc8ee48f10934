//! Policy documents returned to the API gateway.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Policy language version understood by the gateway.
pub const POLICY_VERSION: &str = "2012-10-17";

/// The single action an authorizer policy grants or refuses.
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Invocation permitted
    Allow,
    /// Invocation refused
    Deny,
}

/// One statement of a policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    /// Always [`INVOKE_ACTION`]
    pub action: String,
    /// Allow or Deny
    pub effect: Effect,
    /// Resource the statement applies to
    pub resource: String,
}

/// Policy document with exactly one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Always [`POLICY_VERSION`]
    pub version: String,
    /// Statements, one per decision
    pub statement: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Builds a document covering a single resource.
    pub fn single(effect: Effect, resource: impl Into<String>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: vec![PolicyStatement {
                action: INVOKE_ACTION.to_string(),
                effect,
                resource: resource.into(),
            }],
        }
    }
}

/// Successful authorizer response.
///
/// Either `principal_id` or `context` is set, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    /// Caller identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
    /// Access policy for the requested resource
    pub policy_document: PolicyDocument,
    /// Verified claims, only in debug deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl AuthorizerResponse {
    /// Response granting `principal_id` access to `resource`.
    pub fn allow(principal_id: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            principal_id: Some(principal_id.into()),
            policy_document: PolicyDocument::single(Effect::Allow, resource),
            context: None,
        }
    }

    /// Response granting access and carrying `context` in place of the principal.
    pub fn allow_with_context(resource: impl Into<String>, context: Map<String, Value>) -> Self {
        Self {
            principal_id: None,
            policy_document: PolicyDocument::single(Effect::Allow, resource),
            context: Some(context),
        }
    }
}
