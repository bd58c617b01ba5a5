//! Shared collector state handed to every request handler.

use crate::collector::auth::AuthToken;
use crate::collector::registry::ConnectionRegistry;
use crate::domain::error::{Result, TracelogError};
use crate::domain::Trace;
use crate::storage::TraceStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a handler needs: the token, the archive, and the channel registry.
///
/// Cloning is cheap; all parts are reference counted. The token is fixed for
/// the lifetime of the state.
#[derive(Clone)]
pub struct CollectorState {
    token: Arc<AuthToken>,
    store: Arc<dyn TraceStore>,
    registry: Arc<ConnectionRegistry>,
}

impl CollectorState {
    #[must_use]
    pub fn new(token: AuthToken, store: Arc<dyn TraceStore>) -> Self {
        Self {
            token: Arc::new(token),
            store,
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    #[must_use]
    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Writes `trace` to the archive on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or a storage error if the write task itself
    /// was lost.
    pub async fn persist(&self, trace: Trace) -> Result<PathBuf> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.persist(&trace))
            .await
            .map_err(|e| TracelogError::Storage(format!("persist task failed: {e}")))?
    }
}
