use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockhold_core::{DomainError, DomainResult, Entity, ItemId, ReservationId};

/// Default hold window applied when no explicit TTL is configured.
pub const DEFAULT_RESERVATION_TTL_MINUTES: i64 = 15;

/// A time-bounded hold on `qty` units of one item.
///
/// Immutable once issued. Lives in the in-process ledger until it is
/// committed, released, or swept after expiry; it is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    id: ReservationId,
    item_id: ItemId,
    qty: u32,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Reservation {
    /// Issue a new reservation with a fresh id, expiring `ttl` after `now`.
    pub fn open(
        item_id: ItemId,
        qty: u32,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> DomainResult<Self> {
        if qty == 0 {
            return Err(DomainError::invalid_argument("quantity must be positive"));
        }
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| DomainError::invalid_argument("reservation ttl out of range"))?;

        Ok(Self {
            id: ReservationId::new(),
            item_id,
            qty,
            created_at: now,
            expires_at,
        })
    }

    pub fn id_typed(&self) -> ReservationId {
        self.id
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn qty(&self) -> u32 {
        self.qty
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True once `expires_at` lies strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

impl Entity for Reservation {
    type Id = ReservationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ItemId {
        "sku-7".parse().unwrap()
    }

    fn ttl() -> Duration {
        Duration::minutes(DEFAULT_RESERVATION_TTL_MINUTES)
    }

    #[test]
    fn open_sets_expiry_from_ttl() {
        let now = Utc::now();
        let r = Reservation::open(item(), 3, now, ttl()).unwrap();
        assert_eq!(r.expires_at(), now + Duration::minutes(15));
        assert_eq!(r.created_at(), now);
        assert_eq!(r.qty(), 3);
        assert_eq!(r.item_id(), &item());
        assert_eq!(*r.id(), r.id_typed());
    }

    #[test]
    fn zero_quantity_cannot_be_reserved() {
        let err = Reservation::open(item(), 0, Utc::now(), ttl()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn expiry_is_strict() {
        let now = Utc::now();
        let r = Reservation::open(item(), 1, now, ttl()).unwrap();
        assert!(!r.is_expired_at(now));
        assert!(!r.is_expired_at(r.expires_at()));
        assert!(r.is_expired_at(r.expires_at() + Duration::milliseconds(1)));
    }

    #[test]
    fn each_reservation_gets_a_fresh_id() {
        let now = Utc::now();
        let a = Reservation::open(item(), 1, now, ttl()).unwrap();
        let b = Reservation::open(item(), 1, now, ttl()).unwrap();
        assert_ne!(a.id_typed(), b.id_typed());
    }
}
