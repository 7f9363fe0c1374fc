//! Inventory domain module.
//!
//! This crate contains the stock bookkeeping rules for reservable items,
//! implemented purely as deterministic domain logic (no IO, no locks, no storage).
//! Concurrency control and persistence live in `stockhold-infra`.

pub mod record;
pub mod reservation;

pub use record::InventoryRecord;
pub use reservation::{DEFAULT_RESERVATION_TTL_MINUTES, Reservation};
