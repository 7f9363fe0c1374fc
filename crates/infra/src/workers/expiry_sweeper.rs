//! Periodic expiry sweep.
//!
//! The engine only exposes `expire_sweep()`; something has to call it on a
//! timer. This worker is that timer for single-process deployments. Hosts with
//! their own scheduler can ignore it and invoke the sweep directly.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::SweeperConfig;
use crate::reservations::ReservationEngine;
use crate::store::InventoryStore;

/// Sweeper runtime statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SweeperStats {
    pub sweeps_run: u64,
    pub reservations_released: u64,
    pub uptime_secs: u64,
}

/// Handle to control a running sweeper.
#[derive(Debug)]
pub struct ExpirySweeperHandle {
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
    stats: Arc<Mutex<SweeperStats>>,
}

impl ExpirySweeperHandle {
    /// Request graceful shutdown and wait for the in-flight sweep to finish.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }

    pub fn stats(&self) -> SweeperStats {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Runs `expire_sweep` every `SweeperConfig::interval` on a dedicated thread.
#[derive(Debug)]
pub struct ExpirySweeper;

impl ExpirySweeper {
    pub fn spawn<S>(
        engine: Arc<ReservationEngine<S>>,
        config: SweeperConfig,
    ) -> io::Result<ExpirySweeperHandle>
    where
        S: InventoryStore + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let stats = Arc::new(Mutex::new(SweeperStats::default()));
        let stats_clone = stats.clone();

        let join = thread::Builder::new()
            .name(config.name.clone())
            .spawn(move || sweeper_loop(&*engine, &config, &shutdown_rx, &stats_clone))?;

        Ok(ExpirySweeperHandle {
            shutdown: shutdown_tx,
            join: Some(join),
            stats,
        })
    }
}

fn sweeper_loop<S: InventoryStore>(
    engine: &ReservationEngine<S>,
    config: &SweeperConfig,
    shutdown_rx: &mpsc::Receiver<()>,
    stats: &Mutex<SweeperStats>,
) {
    info!(
        sweeper = %config.name,
        interval_ms = config.interval.as_millis() as u64,
        "expiry sweeper started"
    );
    let start_time = Instant::now();

    loop {
        match shutdown_rx.recv_timeout(config.interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let released = engine.expire_sweep();
        if released > 0 {
            debug!(sweeper = %config.name, released, "sweep released expired reservations");
        }

        let mut s = stats.lock().unwrap_or_else(PoisonError::into_inner);
        s.sweeps_run += 1;
        s.reservations_released += released as u64;
        s.uptime_secs = start_time.elapsed().as_secs();
    }

    info!(sweeper = %config.name, "expiry sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    use chrono::{Duration, Utc};
    use stockhold_core::ItemId;
    use stockhold_inventory::InventoryRecord;

    use crate::config::ReservationConfig;
    use crate::store::InMemoryInventoryStore;

    fn item() -> ItemId {
        "sku".parse().unwrap()
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + StdDuration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(StdDuration::from_millis(5));
        }
        false
    }

    #[test]
    fn sweeper_returns_expired_stock_in_background() {
        let store = InMemoryInventoryStore::seeded([InventoryRecord::new(item(), 10)]);
        let engine = Arc::new(ReservationEngine::new(store, ReservationConfig::default()));
        engine
            .reserve_at(&item(), 4, Utc::now() - Duration::hours(1))
            .unwrap();
        let live = engine.reserve(&item(), 1).unwrap();

        let handle = ExpirySweeper::spawn(
            engine.clone(),
            SweeperConfig::default().with_interval(StdDuration::from_millis(10)),
        )
        .unwrap();

        assert!(wait_until(|| handle.stats().reservations_released == 1));
        handle.shutdown();

        let record = engine.record(&item()).unwrap();
        assert_eq!((record.available_qty(), record.reserved_qty()), (9, 1));
        assert!(engine.reservation(&live.id_typed()).is_some());
    }

    #[test]
    fn shutdown_stops_promptly() {
        let engine = Arc::new(ReservationEngine::new(
            InMemoryInventoryStore::new(),
            ReservationConfig::default(),
        ));
        let handle = ExpirySweeper::spawn(engine, SweeperConfig::default()).unwrap();

        let start = Instant::now();
        handle.shutdown();
        assert!(start.elapsed() < StdDuration::from_secs(5));
    }
}
