//! The reservation protocol.
//!
//! Every stock mutation follows the same sequence:
//!
//! ```text
//! lock item → load record → validate/mutate → save record → update ledger → unlock
//! ```
//!
//! Only one item lock is ever held per call, so operations on different items
//! never block each other and cannot deadlock. The ledger is synchronized on
//! its own: `commit` and `release` remove the reservation *before* taking the
//! item lock, which makes the removal the single point where racing callers
//! (user commit, user release, expiry sweep) are arbitrated.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use stockhold_core::{DomainError, DomainResult, ItemId, ReservationId};
use stockhold_inventory::{InventoryRecord, Reservation};

use crate::config::ReservationConfig;
use crate::store::InventoryStore;

use super::ReservationContext;

/// Reserve / commit / release / expire over one record store.
#[derive(Debug)]
pub struct ReservationEngine<S> {
    store: S,
    context: Arc<ReservationContext>,
    config: ReservationConfig,
}

impl<S> ReservationEngine<S> {
    /// Engine with a fresh, private context.
    pub fn new(store: S, config: ReservationConfig) -> Self {
        Self::with_context(store, Arc::new(ReservationContext::new()), config)
    }

    pub fn with_context(
        store: S,
        context: Arc<ReservationContext>,
        config: ReservationConfig,
    ) -> Self {
        Self {
            store,
            context,
            config,
        }
    }

    pub fn context(&self) -> &Arc<ReservationContext> {
        &self.context
    }

    pub fn config(&self) -> &ReservationConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reservation(&self, id: &ReservationId) -> Option<Reservation> {
        self.context.ledger().get(id)
    }

    pub fn active_reservations(&self) -> Vec<Reservation> {
        self.context.ledger().snapshot()
    }
}

impl<S> ReservationEngine<S>
where
    S: InventoryStore,
{
    pub fn record(&self, item_id: &ItemId) -> Option<InventoryRecord> {
        self.store.find_by_id(item_id)
    }

    /// Hold `qty` units of `item_id` until committed, released, or expired.
    pub fn reserve(&self, item_id: &ItemId, qty: i64) -> DomainResult<Reservation> {
        self.reserve_at(item_id, qty, Utc::now())
    }

    pub fn reserve_at(
        &self,
        item_id: &ItemId,
        qty: i64,
        now: DateTime<Utc>,
    ) -> DomainResult<Reservation> {
        let qty = match u32::try_from(qty) {
            Ok(q) if q > 0 => q,
            _ => {
                return Err(DomainError::invalid_argument(format!(
                    "quantity must be a positive integer, got {qty}"
                )));
            }
        };

        let lock = self.context.locks().get_or_create(item_id);
        let _guard = lock.acquire();

        let mut record = self
            .store
            .find_by_id(item_id)
            .ok_or_else(|| DomainError::not_found(format!("item {item_id}")))?;

        record.hold(qty)?;
        let reservation = Reservation::open(item_id.clone(), qty, now, self.config.ttl)?;

        let saved = self.store.save(record);
        self.context.ledger().insert(reservation.clone());

        debug!(
            item_id = %item_id,
            reservation_id = %reservation.id_typed(),
            qty,
            available = saved.available_qty(),
            reserved = saved.reserved_qty(),
            expires_at = %reservation.expires_at(),
            "stock reserved"
        );
        Ok(reservation)
    }

    /// Finalize a reservation into a permanent stock reduction.
    ///
    /// The reservation is consumed even when the call fails with `Expired`;
    /// its held stock is *not* returned here. Until the next expiry sweep runs
    /// that stock stays reserved, but the sweep can no longer find it either,
    /// since the ledger entry is gone.
    ///
    /// If the stored record holds less reserved stock than the reservation
    /// (an out-of-band edit), the call fails with `InvalidArgument`; the entry
    /// is consumed and the record keeps whatever it has reserved.
    pub fn commit(&self, id: &ReservationId) -> DomainResult<()> {
        self.commit_at(id, Utc::now())
    }

    pub fn commit_at(&self, id: &ReservationId, now: DateTime<Utc>) -> DomainResult<()> {
        let reservation = self
            .context
            .ledger()
            .remove(id)
            .ok_or(DomainError::InvalidOrExpired(*id))?;

        if reservation.is_expired_at(now) {
            warn!(
                reservation_id = %id,
                item_id = %reservation.item_id(),
                qty = reservation.qty(),
                expires_at = %reservation.expires_at(),
                "commit rejected: reservation expired"
            );
            return Err(DomainError::Expired(*id));
        }

        let item_id = reservation.item_id();
        let lock = self.context.locks().get_or_create(item_id);
        let _guard = lock.acquire();

        let mut record = self.store.find_by_id(item_id).ok_or_else(|| {
            warn!(reservation_id = %id, item_id = %item_id, "record vanished before commit");
            DomainError::not_found(format!("item {item_id}"))
        })?;

        record.finalize(reservation.qty())?;
        let saved = self.store.save(record);

        debug!(
            item_id = %item_id,
            reservation_id = %id,
            qty = reservation.qty(),
            available = saved.available_qty(),
            reserved = saved.reserved_qty(),
            "reservation committed"
        );
        Ok(())
    }

    /// Cancel a reservation and return its stock to the available pool.
    ///
    /// Never fails: unknown, already-committed, already-released and
    /// already-swept ids are silently ignored, so any number of cleanup paths
    /// may call this for the same id.
    pub fn release(&self, id: &ReservationId) {
        let _ = self.release_inner(id);
    }

    /// Release every reservation whose hold window has elapsed.
    ///
    /// Each expired entry is released independently (N atomic releases, not one
    /// atomic sweep). Returns how many reservations had their stock returned by
    /// this sweep. Entries a concurrent commit/release removed first are not
    /// counted, nor are entries dropped without touching a record (no item lock,
    /// vanished record, or a record holding less reserved stock than expected).
    pub fn expire_sweep(&self) -> usize {
        self.expire_sweep_at(Utc::now())
    }

    pub fn expire_sweep_at(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<Reservation> = self
            .context
            .ledger()
            .snapshot()
            .into_iter()
            .filter(|r| r.is_expired_at(now))
            .collect();

        let mut released = 0;
        for reservation in expired {
            let outcome = self.release_inner(&reservation.id_typed());
            if let Some(ReleaseOutcome::Returned(r)) = outcome {
                info!(
                    reservation_id = %r.id_typed(),
                    item_id = %r.item_id(),
                    qty = r.qty(),
                    expires_at = %r.expires_at(),
                    "expired reservation released"
                );
                released += 1;
            }
        }
        released
    }

    /// `None` when another caller removed the entry first.
    fn release_inner(&self, id: &ReservationId) -> Option<ReleaseOutcome> {
        let reservation = self.context.ledger().remove(id)?;
        let item_id = reservation.item_id();

        let Some(lock) = self.context.locks().get(item_id) else {
            warn!(reservation_id = %id, item_id = %item_id, "no item lock; entry dropped");
            return Some(ReleaseOutcome::Dropped);
        };
        let _guard = lock.acquire();

        let Some(mut record) = self.store.find_by_id(item_id) else {
            warn!(reservation_id = %id, item_id = %item_id, "record vanished before release");
            return Some(ReleaseOutcome::Dropped);
        };

        if let Err(e) = record.restore(reservation.qty()) {
            warn!(reservation_id = %id, item_id = %item_id, error = %e, "release skipped");
            return Some(ReleaseOutcome::Dropped);
        }
        let saved = self.store.save(record);

        debug!(
            item_id = %item_id,
            reservation_id = %id,
            qty = reservation.qty(),
            available = saved.available_qty(),
            reserved = saved.reserved_qty(),
            "reservation released"
        );
        Some(ReleaseOutcome::Returned(reservation))
    }
}

/// What happened to a ledger entry removed by `release_inner`.
#[derive(Debug)]
enum ReleaseOutcome {
    /// Held stock went back to the available pool.
    Returned(Reservation),
    /// Entry removed, record left untouched.
    Dropped,
}
