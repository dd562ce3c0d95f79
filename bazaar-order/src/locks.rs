use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

type Registry = Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>>;

/// Per-order mutual exclusion for status changes.
///
/// Entries are created on demand and removed when the last holder or waiter
/// lets go, so the map only ever holds orders that are being worked on.
#[derive(Clone, Default)]
pub(crate) struct OrderLocks {
    inner: Registry,
}

pub(crate) struct OrderLockGuard {
    id: Uuid,
    registry: Registry,
    lock: Arc<tokio::sync::Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl OrderLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn acquire(&self, id: Uuid) -> OrderLockGuard {
        let lock = {
            let mut registry = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            Arc::clone(registry.entry(id).or_default())
        };

        let guard = Arc::clone(&lock).lock_owned().await;

        OrderLockGuard {
            id,
            registry: Arc::clone(&self.inner),
            lock,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

impl Drop for OrderLockGuard {
    fn drop(&mut self) {
        self.guard.take();

        let mut registry = self.registry.lock().unwrap_or_else(|p| p.into_inner());
        // One reference in the map, one held here: nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            registry.remove(&self.id);
        }
    }
}
