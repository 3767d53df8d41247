//! Process-wide registry of live session controllers (§4.5).
//!
//! A `RwLock`-guarded map plus a background worker that drains a
//! deregistration queue, so that callers tearing a session down don't
//! block on the registry lock themselves.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::RwLock;

use crate::controller::SessionController;
use crate::error::RegistryError;

/// Maps `callConnectionId` → session controller. Multi-producer /
/// multi-consumer; all mutations are concurrency-safe.
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Arc<SessionController>>>>,
    deregister_tx: mpsc::UnboundedSender<String>,
}

impl SessionRegistry {
    /// Create a registry and spawn its background deregistration worker.
    #[must_use]
    pub fn new() -> Self {
        let sessions: Arc<RwLock<HashMap<String, Arc<SessionController>>>> =
            Arc::new(RwLock::new(HashMap::new()));
        let (deregister_tx, mut deregister_rx) = mpsc::unbounded_channel::<String>();

        let worker_sessions = sessions.clone();
        tokio::spawn(async move {
            while let Some(call_connection_id) = deregister_rx.recv().await {
                let mut guard = worker_sessions.write().await;
                if guard.remove(&call_connection_id).is_some() {
                    tracing::info!(%call_connection_id, "session deregistered");
                }
            }
        });

        Self {
            sessions,
            deregister_tx,
        }
    }

    /// Register a session under its call connection id.
    pub async fn register(
        &self,
        call_connection_id: String,
        controller: Arc<SessionController>,
    ) -> Result<(), RegistryError> {
        let mut guard = self.sessions.write().await;
        if guard.contains_key(&call_connection_id) {
            return Err(RegistryError::AlreadyRegistered(call_connection_id));
        }
        guard.insert(call_connection_id, controller);
        Ok(())
    }

    /// Schedule deregistration. Non-blocking: the actual removal happens on
    /// the background worker so the caller (typically `stop()`'s shutdown
    /// path) never waits on the registry lock.
    pub fn deregister(&self, call_connection_id: String) {
        let _ = self.deregister_tx.send(call_connection_id);
    }

    pub async fn get(&self, call_connection_id: &str) -> Option<Arc<SessionController>> {
        self.sessions.read().await.get(call_connection_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Invoke `f` for every live session. Used by health endpoints that
    /// need to aggregate per-session state.
    pub async fn for_each<F: FnMut(&str, &Arc<SessionController>)>(&self, mut f: F) {
        let guard = self.sessions.read().await;
        for (id, controller) in guard.iter() {
            f(id, controller);
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_session_is_none() {
        let registry = SessionRegistry::new();
        assert!(registry.get("missing").await.is_none());
    }

    #[tokio::test]
    async fn count_starts_at_zero() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.count().await, 0);
    }
}
