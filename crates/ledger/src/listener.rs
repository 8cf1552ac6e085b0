//! Commit listener registry.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::ListenerError;

/// Identifier handed out when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw numeric id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// A subscription to commit notifications for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub transaction_id: String,
    pub organization: String,
}

impl Listener {
    /// Creates a commit listener for a transaction submitted through `organization`.
    pub fn commit(transaction_id: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            organization: organization.into(),
        }
    }
}

/// Process-wide registry of active listeners.
///
/// Methods are synchronous so that teardown can run from a panic hook.
pub trait ListenerRegistry: Send + Sync {
    /// Registers a listener and returns its id.
    fn register(&self, listener: Listener) -> ListenerId;

    /// Number of listeners not yet released.
    fn active_count(&self) -> usize;

    /// Releases every active listener and returns how many were released.
    ///
    /// Must succeed as a no-op when nothing is registered.
    fn release_all(&self) -> Result<usize, ListenerError>;
}

#[derive(Debug, Default)]
struct RegistryState {
    active: BTreeMap<ListenerId, Listener>,
    next_id: u64,
    release_calls: usize,
    fail_on_release: bool,
}

/// In-memory listener registry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryListenerRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl InMemoryListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere must not stop teardown from reaching the registry.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the registry to fail on the next release call.
    pub fn set_fail_on_release(&self, fail: bool) {
        self.lock().fail_on_release = fail;
    }

    /// Returns how many times `release_all` has been called.
    pub fn release_count(&self) -> usize {
        self.lock().release_calls
    }

    /// Returns the active listeners in registration order.
    pub fn active(&self) -> Vec<Listener> {
        self.lock().active.values().cloned().collect()
    }
}

impl ListenerRegistry for InMemoryListenerRegistry {
    fn register(&self, listener: Listener) -> ListenerId {
        let mut state = self.lock();
        state.next_id += 1;
        let id = ListenerId(state.next_id);
        tracing::debug!(%id, tx = %listener.transaction_id, "listener registered");
        state.active.insert(id, listener);
        id
    }

    fn active_count(&self) -> usize {
        self.lock().active.len()
    }

    fn release_all(&self) -> Result<usize, ListenerError> {
        let mut state = self.lock();
        state.release_calls += 1;

        if state.fail_on_release {
            return Err(ListenerError::ReleaseFailed(format!(
                "{} listener(s) still attached",
                state.active.len()
            )));
        }

        let released = state.active.len();
        state.active.clear();
        tracing::debug!(released, "listeners released");
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_release() {
        let registry = InMemoryListenerRegistry::new();
        let a = registry.register(Listener::commit("tx-0001", "importerorg"));
        let b = registry.register(Listener::commit("tx-0002", "exporterorg"));

        assert!(a < b);
        assert_eq!(registry.active_count(), 2);
        assert_eq!(registry.active()[0].transaction_id, "tx-0001");

        assert_eq!(registry.release_all().unwrap(), 2);
        assert_eq!(registry.active_count(), 0);
        assert_eq!(registry.release_count(), 1);
    }

    #[test]
    fn test_release_on_empty_registry_is_noop() {
        let registry = InMemoryListenerRegistry::new();
        assert_eq!(registry.release_all().unwrap(), 0);
        assert_eq!(registry.release_count(), 1);
    }

    #[test]
    fn test_fail_on_release_keeps_listeners() {
        let registry = InMemoryListenerRegistry::new();
        registry.register(Listener::commit("tx-0001", "lenderorg"));
        registry.set_fail_on_release(true);

        let result = registry.release_all();
        assert!(matches!(result, Err(ListenerError::ReleaseFailed(_))));
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn test_listener_id_display() {
        let registry = InMemoryListenerRegistry::new();
        let id = registry.register(Listener::commit("tx-0001", "carrierorg"));
        assert_eq!(id.to_string(), "listener-1");
        assert_eq!(id.as_u64(), 1);
    }
}
