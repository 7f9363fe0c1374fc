//! Tracing/logging initialization.
//!
//! JSON lines on stdout, filtered through `RUST_LOG` when set. Reservation
//! events carry `item_id` / `reservation_id` fields, so a filter such as
//! `RUST_LOG=stockhold_infra=debug` is enough to follow one item's stock.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .try_init();
}
