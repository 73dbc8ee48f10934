//! JWK Cache with Single-Flight Refresh
//!
//! Holds the provider's signing keys in memory:
//! - Keys live for the `Cache-Control: max-age` the provider advertises,
//!   or the configured TTL when it sends none
//! - Concurrent refreshes share one HTTP request
//! - An unknown `kid` triggers at most one refresh per lookup

use crate::error::AuthorizerError;
use arc_swap::ArcSwapOption;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use jsonwebtoken::DecodingKey;
use reqwest::header::{CACHE_CONTROL, HeaderMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use url::Url;

const SERVICE: &str = "jwks";

/// JSON Web Key structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (RSA)
    pub kty: String,
    /// Key ID
    pub kid: String,
    /// Key use (sig, enc)
    #[serde(rename = "use", default)]
    pub key_use: Option<String>,
    /// Algorithm
    #[serde(default)]
    pub alg: Option<String>,
    /// RSA modulus
    #[serde(default)]
    pub n: Option<String>,
    /// RSA exponent
    #[serde(default)]
    pub e: Option<String>,
}

/// JSON Web Key Set structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwks {
    /// List of keys
    pub keys: Vec<Jwk>,
}

struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
    ttl: Duration,
}

impl KeySet {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }
}

type InflightFuture = Shared<BoxFuture<'static, Result<usize, Arc<AuthorizerError>>>>;

/// Signing key cache with single-flight refresh.
pub struct JwkCache {
    current: Arc<ArcSwapOption<KeySet>>,
    jwks_url: Url,
    fallback_ttl: Duration,
    inflight: Mutex<Option<InflightFuture>>,
    http_client: reqwest::Client,
}

impl JwkCache {
    /// Creates an empty cache; keys are fetched on first use.
    pub fn new(jwks_url: Url, fallback_ttl: Duration, http_client: reqwest::Client) -> Self {
        Self {
            current: Arc::new(ArcSwapOption::empty()),
            jwks_url,
            fallback_ttl,
            inflight: Mutex::new(None),
            http_client,
        }
    }

    /// Gets a decoding key by key ID, refreshing the key set when needed.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<DecodingKey, AuthorizerError> {
        if let Some(key) = self.try_get_local(kid) {
            return Ok(key);
        }

        self.refresh_single_flight().await?;

        self.try_get_local(kid)
            .ok_or_else(|| AuthorizerError::invalid(format!("no signing key matches kid {kid}")))
    }

    fn try_get_local(&self, kid: &str) -> Option<DecodingKey> {
        let guard = self.current.load();
        let set = guard.as_deref()?;
        if set.is_fresh() { set.keys.get(kid).cloned() } else { None }
    }

    /// Checks if the cached key set is missing or expired.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.current.load().as_deref().is_none_or(|set| !set.is_fresh())
    }

    /// Gets the number of cached keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.current.load().as_deref().map_or(0, |set| set.keys.len())
    }

    /// Refreshes the key set.
    ///
    /// Only one HTTP request is made even if many callers ask for a refresh
    /// at the same time; late arrivals await the request already in flight.
    async fn refresh_single_flight(&self) -> Result<(), AuthorizerError> {
        let mut inflight_guard = self.inflight.lock().await;

        // A finished future left behind by a cancelled leader is not reused
        if let Some(fut) = inflight_guard.as_ref().filter(|fut| fut.peek().is_none()) {
            let fut = fut.clone();
            drop(inflight_guard);
            return fut.await.map(|_| ()).map_err(|e| shared_error(&e));
        }

        let url = self.jwks_url.clone();
        let client = self.http_client.clone();
        let current = Arc::clone(&self.current);
        let fallback_ttl = self.fallback_ttl;

        let fut: BoxFuture<'static, Result<usize, Arc<AuthorizerError>>> = Box::pin(async move {
            let set = fetch_key_set(&client, &url, fallback_ttl).await.map_err(Arc::new)?;
            let count = set.keys.len();
            info!(keys = count, ttl_secs = set.ttl.as_secs(), "JWKS cache updated");
            current.store(Some(Arc::new(set)));
            Ok(count)
        });

        let shared_fut = fut.shared();
        *inflight_guard = Some(shared_fut.clone());
        drop(inflight_guard);

        let result = shared_fut.await;
        self.inflight.lock().await.take();

        result.map(|_| ()).map_err(|e| shared_error(&e))
    }
}

async fn fetch_key_set(
    client: &reqwest::Client,
    url: &Url,
    fallback_ttl: Duration,
) -> Result<KeySet, AuthorizerError> {
    info!(url = %url, "Fetching JWKS");

    let response = client.get(url.clone()).send().await?;
    if !response.status().is_success() {
        return Err(AuthorizerError::unavailable(
            SERVICE,
            format!("JWKS fetch failed with status: {}", response.status()),
        ));
    }

    let ttl = max_age(response.headers()).unwrap_or(fallback_ttl);
    let jwks: Jwks = response.json().await?;

    let keys: HashMap<String, DecodingKey> = jwks
        .keys
        .iter()
        .filter_map(|jwk| jwk_to_decoding_key(jwk).map(|key| (jwk.kid.clone(), key)))
        .collect();

    if keys.is_empty() {
        return Err(AuthorizerError::unavailable(SERVICE, "JWKS contained no usable keys"));
    }

    Ok(KeySet {
        keys,
        fetched_at: Instant::now(),
        ttl,
    })
}

/// Reads `max-age` from a `Cache-Control` header.
fn max_age(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get_all(CACHE_CONTROL)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|directive| directive.trim().strip_prefix("max-age="))
        .and_then(|secs| secs.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

/// Converts a JWK to a DecodingKey.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    if jwk.kty != "RSA" {
        warn!(kid = %jwk.kid, kty = %jwk.kty, "Unsupported key type");
        return None;
    }
    if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
        warn!(kid = %jwk.kid, "Key is not an RS256 key, skipping");
        return None;
    }

    let n = jwk.n.as_ref()?;
    let e = jwk.e.as_ref()?;

    // 2048-bit modulus is 342 base64url characters
    if n.len() < 340 {
        warn!(kid = %jwk.kid, "RSA key too small, rejecting");
        return None;
    }

    DecodingKey::from_rsa_components(n, e).ok()
}

fn shared_error(err: &AuthorizerError) -> AuthorizerError {
    match err {
        AuthorizerError::ProviderUnavailable { service, reason } => {
            AuthorizerError::unavailable(service.clone(), reason.clone())
        }
        other => AuthorizerError::unavailable(SERVICE, other.to_string()),
    }
}
