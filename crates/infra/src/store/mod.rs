//! Inventory record store boundary.
//!
//! The durable source of truth for stock quantities. The reservation engine
//! only needs single-record lookup and upsert; transactions across records
//! are never required because every engine operation touches one item.

pub mod in_memory;

pub use in_memory::InMemoryInventoryStore;

use std::sync::Arc;

use stockhold_core::ItemId;
use stockhold_inventory::InventoryRecord;

/// Key/value persistence for inventory records, keyed by item id.
pub trait InventoryStore: Send + Sync {
    fn find_by_id(&self, item_id: &ItemId) -> Option<InventoryRecord>;

    /// Upsert; returns the persisted value.
    fn save(&self, record: InventoryRecord) -> InventoryRecord;
}

impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    fn find_by_id(&self, item_id: &ItemId) -> Option<InventoryRecord> {
        (**self).find_by_id(item_id)
    }

    fn save(&self, record: InventoryRecord) -> InventoryRecord {
        (**self).save(record)
    }
}
