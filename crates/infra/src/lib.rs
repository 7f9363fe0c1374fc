//! Infrastructure layer: record store, reservation engine, config, workers.

pub mod config;
pub mod reservations;
pub mod store;
pub mod workers;


pub use config::{ConfigError, ReservationConfig, StockholdConfig, SweeperConfig};
pub use reservations::{ReservationContext, ReservationEngine};
pub use store::{InMemoryInventoryStore, InventoryStore};
pub use workers::{ExpirySweeper, ExpirySweeperHandle};
