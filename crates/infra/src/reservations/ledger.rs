//! In-process table of active reservations.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use stockhold_core::{Entity, ReservationId};
use stockhold_inventory::Reservation;

/// Active reservations keyed by id.
///
/// Safe under concurrent mutation on its own, independent of the per-item
/// locks: `commit` and `release` remove entries before taking any item lock,
/// and whichever caller removes an entry first owns its follow-up.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    entries: RwLock<HashMap<ReservationId, Reservation>>,
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reservation: Reservation) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(*reservation.id(), reservation);
    }

    /// Remove and return the entry; `None` if another caller got there first.
    pub fn remove(&self, id: &ReservationId) -> Option<Reservation> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(id)
    }

    pub fn get(&self, id: &ReservationId) -> Option<Reservation> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(id).cloned()
    }

    /// Point-in-time copy of all entries (unordered).
    pub fn snapshot(&self) -> Vec<Reservation> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
