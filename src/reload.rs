//! Reload notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Told when the engine has installed a freshly loaded configuration.
pub trait CoreReloadListener: Send + Sync {
    fn reload(&self);
}

/// Handle for removing a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registered listeners, notified in registration order.
#[derive(Default)]
pub struct ReloadListenersContainer {
    listeners: RwLock<Vec<(ListenerId, Arc<dyn CoreReloadListener>)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for ReloadListenersContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadListenersContainer")
            .field("listeners", &self.len())
            .finish()
    }
}

impl ReloadListenersContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn CoreReloadListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&self) {
        // listeners run outside the lock so they may register or remove
        let listeners: Vec<Arc<dyn CoreReloadListener>> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        tracing::debug!(count = listeners.len(), "notifying reload listeners");
        for listener in listeners {
            listener.reload();
        }
    }
}
