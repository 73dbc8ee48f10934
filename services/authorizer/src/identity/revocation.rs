//! Revocation lookup against the Identity Toolkit.
//!
//! A signature-valid token can still belong to a session that was revoked
//! (password change, explicit sign-out everywhere) or to a disabled account.
//! Only the provider knows, so each check costs one `accounts:lookup` call.

use crate::error::AuthorizerError;
use crate::identity::claims::FirebaseClaims;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

const SERVICE: &str = "identity-toolkit";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    local_id: String,
    #[serde(default)]
    disabled: bool,
    /// Seconds since epoch, sent as a string
    #[serde(default)]
    valid_since: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Checks tokens against the provider's account records.
#[derive(Clone)]
pub struct RevocationChecker {
    http_client: reqwest::Client,
    lookup_url: Url,
    api_key: String,
}

impl RevocationChecker {
    /// Creates a checker for the Identity Toolkit at `base_url`.
    pub fn new(
        base_url: &Url,
        api_key: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Result<Self, AuthorizerError> {
        // `accounts:lookup` would parse as a scheme under Url::join
        let raw = format!("{}/accounts:lookup", base_url.as_str().trim_end_matches('/'));
        let lookup_url = Url::parse(&raw)
            .map_err(|e| AuthorizerError::Internal(anyhow::anyhow!("invalid lookup URL {raw}: {e}")))?;

        Ok(Self {
            http_client,
            lookup_url,
            api_key: api_key.into(),
        })
    }

    /// Fails when the account is disabled or its sessions were revoked
    /// after `claims.auth_time`.
    #[instrument(skip_all, fields(sub = %claims.sub))]
    pub async fn check(&self, raw_token: &str, claims: &FirebaseClaims) -> Result<(), AuthorizerError> {
        let response = self
            .http_client
            .post(self.lookup_url.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": raw_token }))
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(AuthorizerError::unavailable(
                SERVICE,
                format!("lookup failed with status: {status}"),
            ));
        }
        if status.is_client_error() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_default();
            return Err(classify_lookup_error(status.as_u16(), &message));
        }

        let lookup: LookupResponse = response.json().await?;
        let user = lookup
            .users
            .iter()
            .find(|user| user.local_id == claims.sub)
            .ok_or_else(|| AuthorizerError::invalid("no account matches token subject"))?;

        if user.disabled {
            return Err(AuthorizerError::UserDisabled);
        }

        let valid_since = user
            .valid_since
            .as_deref()
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(0);
        if claims.auth_time < valid_since {
            debug!(auth_time = claims.auth_time, valid_since, "Session revoked after sign-in");
            return Err(AuthorizerError::TokenRevoked);
        }

        Ok(())
    }
}

/// Maps a 4xx lookup answer onto the error taxonomy.
fn classify_lookup_error(status: u16, message: &str) -> AuthorizerError {
    // Messages look like "USER_DISABLED" or "INVALID_ID_TOKEN : detail"
    let code = message.split(|c: char| c == ' ' || c == ':').next().unwrap_or_default();
    match code {
        "USER_DISABLED" => AuthorizerError::UserDisabled,
        "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "USER_NOT_FOUND" | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => {
            AuthorizerError::invalid(format!("lookup rejected token: {code}"))
        }
        _ if status == 401 || status == 403 || status == 429 => AuthorizerError::unavailable(
            SERVICE,
            format!("lookup refused with status {status}: {message}"),
        ),
        _ => AuthorizerError::invalid(format!("lookup rejected token with status {status}: {message}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_lookup_url_keeps_colon_path() {
        let base = Url::parse("https://identitytoolkit.googleapis.com/v1/").unwrap();
        let checker = RevocationChecker::new(&base, "key", reqwest::Client::new()).unwrap();
        assert_eq!(
            checker.lookup_url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:lookup"
        );
    }

    #[test]
    fn test_classify_lookup_errors() {
        assert_eq!(classify_lookup_error(400, "USER_DISABLED").code(), ErrorCode::UserDisabled);
        assert_eq!(
            classify_lookup_error(400, "INVALID_ID_TOKEN : token is malformed").code(),
            ErrorCode::TokenInvalid
        );
        assert_eq!(
            classify_lookup_error(403, "PERMISSION_DENIED").code(),
            ErrorCode::ProviderUnavailable
        );
        assert_eq!(classify_lookup_error(400, "").code(), ErrorCode::TokenInvalid);
    }
}
