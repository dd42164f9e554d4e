//! Session registry and broadcast fan-out
//!
//! The single process-wide point of coordination for live sessions: enough
//! to inject an out-of-band system message into every active conversation.

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::ServerError;

/// Handle to a live session's conversation task
#[derive(Clone)]
pub struct SessionHandle {
    turns: mpsc::Sender<String>,
}

impl SessionHandle {
    /// Create a handle around the session's turn-injection channel
    pub fn new(turns: mpsc::Sender<String>) -> Self {
        Self { turns }
    }

    /// Inject a system message as a new conversational turn
    ///
    /// Fails when the session's task has terminated or its queue is full.
    pub fn inject(&self, message: String) -> Result<(), ServerError> {
        self.turns
            .try_send(message)
            .map_err(|e| ServerError::Session(e.to_string()))
    }
}

/// Registry of currently-active sessions
///
/// The entry map is the only cross-task shared mutable state in the server;
/// handles are cloned out of the lock before any delivery attempt.
#[derive(Default)]
pub struct SessionRegistry {
    entries: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session; an existing entry with the same id is replaced
    pub fn register(&self, id: impl Into<String>, handle: SessionHandle) {
        let id = id.into();
        if self.entries.write().insert(id.clone(), handle).is_some() {
            tracing::warn!(session_id = %id, "replaced existing registry entry");
        } else {
            tracing::info!("Registered session: {}", id);
        }
    }

    /// Remove a session; no-op when absent
    pub fn unregister(&self, id: &str) {
        if self.entries.write().remove(id).is_some() {
            tracing::info!("Unregistered session: {}", id);
        }
    }

    /// Inject `message` into every live session, best effort
    ///
    /// Per-entry failures are logged and skipped; returns how many sessions
    /// were successfully notified.
    pub fn broadcast(&self, message: &str) -> usize {
        let targets: Vec<(String, SessionHandle)> = self
            .entries
            .read()
            .iter()
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect();

        let mut sent = 0;
        for (id, handle) in targets {
            match handle.inject(message.to_string()) {
                Ok(()) => sent += 1,
                Err(e) => {
                    tracing::warn!(session_id = %id, error = %e, "failed to deliver broadcast");
                }
            }
        }
        sent
    }

    /// Number of live sessions
    pub fn count(&self) -> usize {
        self.entries.read().len()
    }

    /// All live session ids
    pub fn list(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (SessionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(8);
        (SessionHandle::new(tx), rx)
    }

    #[test]
    fn test_register_and_unregister() {
        let registry = SessionRegistry::new();
        let (h, _rx) = handle();

        registry.register("a", h);
        assert_eq!(registry.count(), 1);

        registry.unregister("a");
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let registry = SessionRegistry::new();
        let (h, _rx) = handle();
        registry.register("a", h);

        registry.unregister("never-registered");
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_broadcast_reaches_all_sessions() {
        let registry = SessionRegistry::new();
        let (h1, mut rx1) = handle();
        let (h2, mut rx2) = handle();
        registry.register("a", h1);
        registry.register("b", h2);

        assert_eq!(registry.broadcast("engine check due"), 2);
        assert_eq!(rx1.try_recv().unwrap(), "engine check due");
        assert_eq!(rx2.try_recv().unwrap(), "engine check due");
    }

    #[test]
    fn test_broadcast_skips_dead_session() {
        let registry = SessionRegistry::new();
        let (h1, _rx1) = handle();
        let (h2, rx2) = handle();
        let (h3, _rx3) = handle();
        registry.register("a", h1);
        registry.register("b", h2);
        registry.register("c", h3);

        // One session's task has already terminated
        drop(rx2);

        assert_eq!(registry.broadcast("low fuel"), 2);
    }

    #[test]
    fn test_duplicate_register_replaces() {
        let registry = SessionRegistry::new();
        let (h1, rx1) = handle();
        let (h2, mut rx2) = handle();

        registry.register("a", h1);
        registry.register("a", h2);
        drop(rx1);

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.broadcast("hello"), 1);
        assert!(rx2.try_recv().is_ok());
    }
}
