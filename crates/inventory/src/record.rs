use serde::{Deserialize, Serialize};

use stockhold_core::{DomainError, DomainResult, Entity, ItemId};

/// Stock level of a single catalogue item.
///
/// Total stock is partitioned into `available_qty` (free to reserve) and
/// `reserved_qty` (held, pending commit or release). Unsigned quantities make
/// negative stock unrepresentable; transitions that would underflow are
/// rejected without mutating the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    item_id: ItemId,
    available_qty: u32,
    reserved_qty: u32,
}

impl InventoryRecord {
    /// A freshly stocked item with nothing reserved.
    pub fn new(item_id: ItemId, available_qty: u32) -> Self {
        Self {
            item_id,
            available_qty,
            reserved_qty: 0,
        }
    }

    /// Rebuild a record from persisted quantities.
    pub fn from_parts(item_id: ItemId, available_qty: u32, reserved_qty: u32) -> Self {
        Self {
            item_id,
            available_qty,
            reserved_qty,
        }
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn available_qty(&self) -> u32 {
        self.available_qty
    }

    pub fn reserved_qty(&self) -> u32 {
        self.reserved_qty
    }

    /// Available + reserved.
    pub fn total(&self) -> u64 {
        u64::from(self.available_qty) + u64::from(self.reserved_qty)
    }

    /// Move `qty` from available to reserved.
    pub fn hold(&mut self, qty: u32) -> DomainResult<()> {
        ensure_positive(qty)?;
        if self.available_qty < qty {
            return Err(DomainError::insufficient_stock(
                self.item_id.clone(),
                qty,
                self.available_qty,
            ));
        }
        let reserved = self
            .reserved_qty
            .checked_add(qty)
            .ok_or_else(|| DomainError::invalid_argument("reserved quantity overflow"))?;

        self.available_qty -= qty;
        self.reserved_qty = reserved;
        Ok(())
    }

    /// Turn `qty` of held stock into a permanent reduction.
    ///
    /// Available stock is untouched: it was already decremented by `hold`.
    pub fn finalize(&mut self, qty: u32) -> DomainResult<()> {
        ensure_positive(qty)?;
        self.reserved_qty = self.reserved_qty.checked_sub(qty).ok_or_else(|| {
            DomainError::invalid_argument(format!(
                "cannot finalize {qty}: only {} reserved for {}",
                self.reserved_qty, self.item_id
            ))
        })?;
        Ok(())
    }

    /// Return `qty` of held stock to the available pool (exact inverse of `hold`).
    pub fn restore(&mut self, qty: u32) -> DomainResult<()> {
        ensure_positive(qty)?;
        let reserved = self.reserved_qty.checked_sub(qty).ok_or_else(|| {
            DomainError::invalid_argument(format!(
                "cannot restore {qty}: only {} reserved for {}",
                self.reserved_qty, self.item_id
            ))
        })?;
        let available = self
            .available_qty
            .checked_add(qty)
            .ok_or_else(|| DomainError::invalid_argument("available quantity overflow"))?;

        self.reserved_qty = reserved;
        self.available_qty = available;
        Ok(())
    }
}

impl Entity for InventoryRecord {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.item_id
    }
}

fn ensure_positive(qty: u32) -> DomainResult<()> {
    if qty == 0 {
        return Err(DomainError::invalid_argument("quantity must be positive"));
    }
    Ok(())
}
