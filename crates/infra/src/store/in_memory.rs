use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use stockhold_core::{Entity, ItemId};
use stockhold_inventory::InventoryRecord;

use super::InventoryStore;

/// In-memory record store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    inner: RwLock<HashMap<ItemId, InventoryRecord>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given records.
    pub fn seeded(records: impl IntoIterator<Item = InventoryRecord>) -> Self {
        let store = Self::new();
        store.seed(records);
        store
    }

    pub fn seed(&self, records: impl IntoIterator<Item = InventoryRecord>) {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for record in records {
            map.insert(record.id().clone(), record);
        }
    }

    /// Drop a record (simulates an item vanishing from the catalogue).
    pub fn remove(&self, item_id: &ItemId) -> Option<InventoryRecord> {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.remove(item_id)
    }

    /// All records, sorted by item id.
    pub fn list(&self) -> Vec<InventoryRecord> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut records: Vec<_> = map.values().cloned().collect();
        records.sort_by(|a, b| a.item_id().cmp(b.item_id()));
        records
    }
}

impl InventoryStore for InMemoryInventoryStore {
    fn find_by_id(&self, item_id: &ItemId) -> Option<InventoryRecord> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.get(item_id).cloned()
    }

    fn save(&self, record: InventoryRecord) -> InventoryRecord {
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        map.insert(record.id().clone(), record.clone());
        record
    }
}
