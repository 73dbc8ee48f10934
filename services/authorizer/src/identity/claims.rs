//! Firebase ID token claims.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Claims carried by a Firebase ID token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirebaseClaims {
    /// Issuer, `https://securetoken.google.com/<project>`
    pub iss: String,
    /// Audience, the project id
    pub aud: String,
    /// Firebase user id
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// When the user signed in, seconds since epoch
    pub auth_time: i64,
    /// Primary email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the email was verified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// Provider details such as `sign_in_provider`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase: Option<Value>,
    /// Custom claims and anything else the token carried
    #[serde(flatten)]
    pub custom: HashMap<String, Value>,
}

impl FirebaseClaims {
    /// Whether `exp` has passed.
    pub fn is_expired(&self) -> bool {
        self.exp <= chrono::Utc::now().timestamp()
    }

    /// All claims as one JSON object, custom claims flattened in.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => {
                let mut map = Map::new();
                map.insert("sub".to_string(), Value::String(self.sub.clone()));
                map
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> FirebaseClaims {
        serde_json::from_value(json!({
            "iss": "https://securetoken.google.com/demo-project",
            "aud": "demo-project",
            "sub": "user-42",
            "iat": 1_700_000_000,
            "exp": 4_000_000_000_i64,
            "auth_time": 1_700_000_000,
            "user_id": "user-42",
            "firebase": { "sign_in_provider": "password", "identities": { "email": ["a@b.c"] } },
            "role": "admin"
        }))
        .unwrap()
    }

    #[test]
    fn test_custom_claims_are_kept() {
        let claims = sample();
        assert_eq!(claims.custom.get("role"), Some(&json!("admin")));
        assert_eq!(claims.custom.get("user_id"), Some(&json!("user-42")));
        assert_eq!(claims.firebase.as_ref().unwrap()["sign_in_provider"], "password");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_to_map_flattens_custom_claims() {
        let map = sample().to_map();
        assert_eq!(map["sub"], "user-42");
        assert_eq!(map["role"], "admin");
        assert!(map.get("email").is_none());
    }
}
