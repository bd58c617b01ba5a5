//! Registry of open persistent-channel connections.
//!
//! Each accepted channel registers itself and holds a [`ConnectionGuard`]; the
//! guard removes the entry when dropped, so every exit path of a session (clean
//! close, fault, or task cancellation) deregisters it.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Identity of one accepted channel.
pub type ConnectionId = Uuid;

/// What the collector knows about an open channel.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub opened_at: DateTime<Utc>,
}

/// Concurrency-safe set of open channels.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, ConnectionInfo>>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new connection and returns the guard that removes it again.
    #[must_use]
    pub fn register(self: &Arc<Self>) -> ConnectionGuard {
        let id = Uuid::new_v4();
        self.lock().insert(
            id,
            ConnectionInfo {
                opened_at: Utc::now(),
            },
        );
        tracing::debug!(connection = %id, "connection registered");

        ConnectionGuard {
            id,
            registry: Arc::clone(self),
        }
    }

    /// Number of currently open channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &ConnectionId) -> Option<ConnectionInfo> {
        self.lock().get(id).cloned()
    }

    fn remove(&self, id: &ConnectionId) {
        if self.lock().remove(id).is_some() {
            tracing::debug!(connection = %id, "connection deregistered");
        }
    }

    // A panic while holding the lock cannot leave the map half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, ConnectionInfo>> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Registry membership of one channel; deregisters on drop.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
}

impl ConnectionGuard {
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
