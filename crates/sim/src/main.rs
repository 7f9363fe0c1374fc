//! Drives concurrent checkout traffic against an in-memory catalogue, lets the
//! expiry sweeper reclaim abandoned holds, then checks that every unit of stock
//! is accounted for.

use std::sync::Arc;
use std::thread;
use std::time::Duration as StdDuration;

use anyhow::{Context, bail};
use chrono::Duration;
use serde::Serialize;

use stockhold_core::{DomainError, ItemId};
use stockhold_infra::config::{RESERVATION_TTL_ENV, SWEEP_INTERVAL_ENV};
use stockhold_infra::{ExpirySweeper, InMemoryInventoryStore, ReservationEngine, StockholdConfig};
use stockhold_inventory::InventoryRecord;

const ITEMS: usize = 4;
const INITIAL_STOCK: u32 = 200;
const SHOPPERS: usize = 8;
const CARTS_PER_SHOPPER: usize = 60;

#[derive(Debug, Default, Serialize)]
struct ShopperTally {
    committed: [u32; ITEMS],
    /// Held by commits that lost to expiry; see `ReservationEngine::commit`.
    stranded: [u32; ITEMS],
    released: usize,
    abandoned: usize,
    rejected: usize,
}

#[derive(Debug, Serialize)]
struct ItemSummary {
    item_id: ItemId,
    available: u32,
    reserved: u32,
    sold: u32,
    stranded: u32,
}

fn item(n: usize) -> anyhow::Result<ItemId> {
    Ok(format!("sku-{n:03}").parse()?)
}

fn main() -> anyhow::Result<()> {
    stockhold_observability::init();

    let mut config = StockholdConfig::from_env().context("invalid configuration")?;
    // Short windows unless overridden, so abandoned carts expire during the run.
    if std::env::var_os(RESERVATION_TTL_ENV).is_none() {
        config.reservation.ttl = Duration::milliseconds(250);
    }
    if std::env::var_os(SWEEP_INTERVAL_ENV).is_none() {
        config.sweeper.interval = StdDuration::from_millis(50);
    }
    tracing::info!(
        ttl_ms = config.reservation.ttl.num_milliseconds(),
        sweep_interval_ms = config.sweeper.interval.as_millis() as u64,
        "starting simulation"
    );

    let items = (0..ITEMS).map(item).collect::<anyhow::Result<Vec<_>>>()?;
    let store = InMemoryInventoryStore::seeded(
        items.iter().map(|id| InventoryRecord::new(id.clone(), INITIAL_STOCK)),
    );
    let engine = Arc::new(ReservationEngine::new(store, config.reservation.clone()));
    let sweeper = ExpirySweeper::spawn(engine.clone(), config.sweeper.clone())
        .context("failed to start expiry sweeper")?;

    let shoppers: Vec<_> = (0..SHOPPERS)
        .map(|shopper| {
            let engine = engine.clone();
            let items = items.clone();
            thread::spawn(move || shop(&engine, &items, shopper))
        })
        .collect();

    let mut tally = ShopperTally::default();
    for handle in shoppers {
        let t = handle
            .join()
            .map_err(|_| anyhow::anyhow!("shopper thread panicked"))??;
        for n in 0..ITEMS {
            tally.committed[n] += t.committed[n];
            tally.stranded[n] += t.stranded[n];
        }
        tally.released += t.released;
        tally.abandoned += t.abandoned;
        tally.rejected += t.rejected;
    }

    let ttl = config
        .reservation
        .ttl
        .to_std()
        .context("reservation ttl must be positive")?;
    thread::sleep(ttl + config.sweeper.interval * 2);
    let stats = sweeper.stats();
    sweeper.shutdown();
    let late = engine.expire_sweep();

    let mut summary = Vec::with_capacity(ITEMS);
    for (n, id) in items.iter().enumerate() {
        let record = engine
            .record(id)
            .with_context(|| format!("record {id} disappeared"))?;
        summary.push(ItemSummary {
            item_id: id.clone(),
            available: record.available_qty(),
            reserved: record.reserved_qty(),
            sold: tally.committed[n],
            stranded: tally.stranded[n],
        });
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "tally": tally,
            "sweeper": stats,
            "released_after_shutdown": late,
            "items": summary,
        }))?
    );

    for s in &summary {
        if s.reserved != s.stranded || s.available + s.sold + s.stranded != INITIAL_STOCK {
            bail!("stock not conserved for {}: {s:?}", s.item_id);
        }
    }
    if !engine.active_reservations().is_empty() {
        bail!("reservations left in the ledger after final sweep");
    }

    tracing::info!("simulation finished; all stock accounted for");
    Ok(())
}

/// One shopper's carts: commit, release or abandon, in a fixed rotation.
fn shop(
    engine: &ReservationEngine<InMemoryInventoryStore>,
    items: &[ItemId],
    shopper: usize,
) -> anyhow::Result<ShopperTally> {
    let mut tally = ShopperTally::default();

    for cart in 0..CARTS_PER_SHOPPER {
        let slot = (shopper + cart) % items.len();
        let qty = (cart % 5 + 1) as i64;

        let reservation = match engine.reserve(&items[slot], qty) {
            Ok(r) => r,
            Err(e) if e.is_retryable() => {
                tally.rejected += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match cart % 4 {
            0 => match engine.commit(&reservation.id_typed()) {
                Ok(()) => tally.committed[slot] += reservation.qty(),
                // Swept between reserve and commit: the sweeper already returned the stock.
                Err(DomainError::InvalidOrExpired(_)) => tally.rejected += 1,
                Err(DomainError::Expired(_)) => tally.stranded[slot] += reservation.qty(),
                Err(e) => return Err(e.into()),
            },
            1 | 2 => {
                engine.release(&reservation.id_typed());
                tally.released += 1;
            }
            _ => tally.abandoned += 1,
        }
    }

    Ok(tally)
}
