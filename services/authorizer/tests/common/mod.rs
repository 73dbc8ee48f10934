//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use authorizer::{AuthorizerError, Config, IdentityProvider, VerifiedIdentity};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};

pub const PROJECT_ID: &str = "demo-project";
pub const API_KEY: &str = "test-api-key";
pub const KID: &str = "test-key-1";
pub const ARN: &str = "arn:aws:execute-api:us-east-1:123456789012:abcdef/prod/GET/items";

const TEST_KEY_PEM: &str = include_str!("../fixtures/test_signing_key.pem");
const TEST_KEY_N: &str = "yhXw3A2zmPPOINHXDG6C4b5dxzTazXUGeL6oBo2p3L_4n-I9G_v_1QVMSFLlg966ArRg8Ef8Ma3j9jraUMnp_lFm1Cg9hhrE1g7N6NvRJriEZWJCdUyZDfEomw4p7knRuOtO5UMNBoDfqMUvppb1E79TBcSG8obDQr86jf4xz4qUCzoufIjVcD20W4njj7t4BpKQf-Z23J1MUtvUxLopkuFfWhb_2DwaiFLFKvh3UJg83OsqShId2k-MfCNkQ5JK0We4fGgSDFE5r8GfIdpRXblFx8hbsPqWkH7eaSIJMTJYIkVmwvZLjG70jxuygI3MMW2Fvvrd3HAHkgt67t9Cxw";

/// JWKS document publishing the test key.
pub fn jwks_body() -> Value {
    json!({
        "keys": [{
            "kty": "RSA",
            "kid": KID,
            "use": "sig",
            "alg": "RS256",
            "n": TEST_KEY_N,
            "e": "AQAB"
        }]
    })
}

/// Valid claims for `sub`, with `overrides` merged on top.
pub fn claims(sub: &str, overrides: Value) -> Value {
    let now = chrono::Utc::now().timestamp();
    let mut claims = json!({
        "iss": format!("https://securetoken.google.com/{PROJECT_ID}"),
        "aud": PROJECT_ID,
        "sub": sub,
        "user_id": sub,
        "iat": now - 60,
        "exp": now + 3600,
        "auth_time": now - 300,
        "firebase": { "sign_in_provider": "password" }
    });
    if let (Some(base), Some(extra)) = (claims.as_object_mut(), overrides.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    claims
}

/// Signs `claims` with the test key under `kid`.
pub fn sign_with_kid(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_KEY_PEM.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

pub fn sign(claims: &Value) -> String {
    sign_with_kid(claims, KID)
}

/// Configuration pointing both provider endpoints at `server_uri`.
pub fn config_for(server_uri: &str, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("FIREBASE_PROJECT_ID".into(), PROJECT_ID.into());
    vars.insert("FIREBASE_API_KEY".into(), API_KEY.into());
    vars.insert("FIREBASE_JWKS_URL".into(), format!("{server_uri}/jwks"));
    vars.insert("IDENTITY_TOOLKIT_URL".into(), format!("{server_uri}/v1"));
    vars.insert("HTTP_TIMEOUT_SECS".into(), "2".into());
    for (k, v) in extra {
        vars.insert((*k).to_string(), (*v).to_string());
    }
    Config::from_lookup(|name| vars.get(name).cloned()).unwrap()
}

/// Provider that accepts a fixed set of tokens and counts calls.
#[derive(Default)]
pub struct FakeProvider {
    accepted: HashMap<String, String>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl FakeProvider {
    pub fn accepting(token: &str, sub: &str) -> Self {
        let mut accepted = HashMap::new();
        accepted.insert(token.to_string(), sub.to_string());
        Self {
            accepted,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn verify_token(
        &self,
        token: &str,
        _check_revoked: bool,
    ) -> Result<VerifiedIdentity, AuthorizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.accepted
            .get(token)
            .map(VerifiedIdentity::from_subject)
            .ok_or_else(|| AuthorizerError::invalid("unknown token"))
    }
}

/// Provider whose verification panics.
pub struct PanickingProvider;

#[async_trait]
impl IdentityProvider for PanickingProvider {
    async fn verify_token(
        &self,
        _token: &str,
        _check_revoked: bool,
    ) -> Result<VerifiedIdentity, AuthorizerError> {
        panic!("provider bug");
    }
}
