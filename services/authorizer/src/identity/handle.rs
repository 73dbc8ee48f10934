//! Process-wide identity provider handle.
//!
//! The provider owns the key cache and HTTP connection pool, so it is built
//! once per process and shared by every request. Concurrent first callers
//! wait for a single initialization instead of racing to build their own.

use crate::config::Config;
use crate::error::AuthorizerError;
use crate::identity::firebase::FirebaseAuth;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;
use url::Url;

/// Lazily initialized, read-only shared handle.
pub struct ProviderCell<P> {
    cell: OnceCell<Arc<P>>,
}

impl<P> ProviderCell<P> {
    /// Creates an empty cell.
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Returns the handle, running `init` only if no handle exists yet.
    ///
    /// A failed `init` leaves the cell empty so a later call can retry.
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<Arc<P>, AuthorizerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<P, AuthorizerError>>,
    {
        self.cell
            .get_or_try_init(|| async { init().await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Returns the handle if it has been initialized.
    pub fn get(&self) -> Option<Arc<P>> {
        self.cell.get().cloned()
    }

    /// Whether the handle has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl<P> Default for ProviderCell<P> {
    fn default() -> Self {
        Self::new()
    }
}

static FIREBASE_AUTH: ProviderCell<FirebaseAuth> = ProviderCell::new();

/// The process-wide Firebase provider, built from `config` on first use.
///
/// Later calls reuse the existing handle and ignore `config`.
pub async fn shared_firebase_auth(config: &Config) -> Result<Arc<FirebaseAuth>, AuthorizerError> {
    FIREBASE_AUTH
        .get_or_try_init(|| async {
            info!(
                project_id = %config.project_id,
                database_url = config.database_url.as_ref().map_or("none", Url::as_str),
                check_revoked = config.check_revoked,
                "Initializing identity provider"
            );
            FirebaseAuth::new(config)
        })
        .await
}
