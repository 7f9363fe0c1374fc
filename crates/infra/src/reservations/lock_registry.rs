//! Lazily-created per-item mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use stockhold_core::ItemId;

/// Exclusive lock guarding one item's read-validate-mutate-persist window.
#[derive(Debug, Clone, Default)]
pub struct ItemLock(Arc<Mutex<()>>);

impl ItemLock {
    /// Block until the item is exclusively held.
    ///
    /// The mutex guards no data, so a panic in a previous holder leaves
    /// nothing inconsistent behind; poisoning is ignored.
    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether both handles refer to the same underlying lock.
    pub fn same_as(&self, other: &ItemLock) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Item id → lock, created on first access and kept for the process lifetime.
///
/// Entries are never evicted. That is fine for a bounded catalogue, but the
/// map grows without limit if item ids are attacker-controlled; `len()` is
/// exposed so callers can watch it.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: RwLock<HashMap<ItemId, ItemLock>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock for `item_id`, creating it if absent.
    pub fn get_or_create(&self, item_id: &ItemId) -> ItemLock {
        if let Some(lock) = self.get(item_id) {
            return lock;
        }
        let mut locks = self.locks.write().unwrap_or_else(PoisonError::into_inner);
        locks.entry(item_id.clone()).or_default().clone()
    }

    /// Lock for `item_id` only if some operation already created it.
    pub fn get(&self, item_id: &ItemId) -> Option<ItemLock> {
        let locks = self.locks.read().unwrap_or_else(PoisonError::into_inner);
        locks.get(item_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.locks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    fn item(id: &str) -> ItemId {
        id.parse().unwrap()
    }

    #[test]
    fn same_item_yields_same_lock() {
        let registry = LockRegistry::new();
        let a = registry.get_or_create(&item("a"));
        let b = registry.get_or_create(&item("a"));
        let c = registry.get_or_create(&item("c"));

        assert!(a.same_as(&b));
        assert!(!a.same_as(&c));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn get_does_not_create() {
        let registry = LockRegistry::new();
        assert!(registry.get(&item("a")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn holders_of_one_item_are_serialized() {
        let registry = Arc::new(LockRegistry::new());
        let lock = registry.get_or_create(&item("a"));
        let (tx, rx) = mpsc::channel();

        let handle = {
            let lock = lock.clone();
            thread::spawn(move || {
                let _guard = lock.acquire();
                tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
            })
        };

        rx.recv().unwrap();
        let start = Instant::now();
        let again = registry.get_or_create(&item("a"));
        let _guard = again.acquire();
        assert!(start.elapsed() >= Duration::from_millis(40));
        handle.join().unwrap();
    }

    #[test]
    fn different_items_do_not_block_each_other() {
        let registry = LockRegistry::new();
        let a = registry.get_or_create(&item("a"));
        let b = registry.get_or_create(&item("b"));

        let _ga = a.acquire();
        let (tx, rx) = mpsc::channel();
        thread::scope(|s| {
            s.spawn(|| {
                let _gb = b.acquire();
                tx.send(()).unwrap();
            });
            rx.recv_timeout(Duration::from_secs(1))
                .expect("lock on another item must not block");
        });
    }
}
