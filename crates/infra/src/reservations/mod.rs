//! Reservation lifecycle: reserve → (commit | release | expire).
//!
//! ## Components
//!
//! - `ReservationLedger`: active reservations, keyed by reservation id
//! - `LockRegistry`: one lazily-created exclusive lock per item id
//! - `ReservationContext`: owns the two above; constructed explicitly and
//!   handed to an engine, so independent engines never share state by accident
//! - `ReservationEngine`: the reserve / commit / release / expire protocol

pub mod engine;
pub mod ledger;
pub mod lock_registry;

pub use engine::ReservationEngine;
pub use ledger::ReservationLedger;
pub use lock_registry::{ItemLock, LockRegistry};

/// In-process state shared by every operation of one engine.
///
/// Scoped to the process lifetime: nothing here survives a restart. The record
/// store stays the only durable source of stock quantities.
#[derive(Debug, Default)]
pub struct ReservationContext {
    ledger: ReservationLedger,
    locks: LockRegistry,
}

impl ReservationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger(&self) -> &ReservationLedger {
        &self.ledger
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }
}
