use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::CatalogKey;

/// In-process serialization of catalog creation per uniqueness key.
///
/// Concurrent deliveries for the same key wait for the first one to finish
/// its find/fetch/insert instead of racing to the provider. Entries are
/// dropped again once nobody holds or waits on them.
#[derive(Debug, Clone, Default)]
pub struct ResolutionLocks {
    slots: Arc<DashMap<CatalogKey, Arc<Mutex<()>>>>,
}

impl ResolutionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: CatalogKey) -> ResolutionGuard {
        let slot = self
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // Cleans up the entry even if this future is dropped while waiting.
        let lease = SlotLease {
            key,
            slots: Arc::clone(&self.slots),
        };
        let guard = slot.lock_owned().await;
        ResolutionGuard {
            _guard: guard,
            _lease: lease,
        }
    }

    /// Keys currently tracked, held or awaited.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Held for the duration of one resolution. Releases the key on drop.
#[derive(Debug)]
pub struct ResolutionGuard {
    // Field order matters: the mutex is released before the lease runs.
    _guard: OwnedMutexGuard<()>,
    _lease: SlotLease,
}

#[derive(Debug)]
struct SlotLease {
    key: CatalogKey,
    slots: Arc<DashMap<CatalogKey, Arc<Mutex<()>>>>,
}

impl Drop for SlotLease {
    fn drop(&mut self) {
        // Only the map itself still references the slot: no holder, no waiter.
        self.slots
            .remove_if(&self.key, |_, slot| Arc::strong_count(slot) == 1);
    }
}
