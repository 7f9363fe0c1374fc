//! Domain error model.

use thiserror::Error;

use crate::id::{ItemId, ReservationId};

/// Result type used across the domain and engine layers.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is synchronous and local to the failing call: a failed
/// operation leaves stock levels and the reservation ledger as they were,
/// except where the variant documents otherwise.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Caller supplied a malformed value (e.g. a non-positive quantity).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The referenced item record does not exist in the store.
    #[error("not found: {0}")]
    NotFound(String),

    /// Not enough available stock to satisfy a reservation.
    #[error("insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },

    /// The reservation is unknown: already committed, released, swept, or never issued.
    #[error("invalid or expired reservation: {0}")]
    InvalidOrExpired(ReservationId),

    /// The reservation was found but its hold window had already elapsed.
    ///
    /// The reservation is consumed by the failing call; its stock is returned
    /// by the expiry sweep, not by commit.
    #[error("reservation expired: {0}")]
    Expired(ReservationId),
}

impl DomainError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn insufficient_stock(item_id: ItemId, requested: u32, available: u32) -> Self {
        Self::InsufficientStock {
            item_id,
            requested,
            available,
        }
    }

    /// Whether retrying the same call later may succeed.
    ///
    /// Only stock shortages are transient; everything else is a caller or
    /// lifecycle error that repeats identically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InsufficientStock { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_insufficient_stock_is_retryable() {
        let item: ItemId = "sku-1".parse().unwrap();
        assert!(DomainError::insufficient_stock(item, 5, 2).is_retryable());
        assert!(!DomainError::invalid_argument("qty").is_retryable());
        assert!(!DomainError::not_found("sku-1").is_retryable());
        assert!(!DomainError::InvalidOrExpired(ReservationId::new()).is_retryable());
        assert!(!DomainError::Expired(ReservationId::new()).is_retryable());
    }

    #[test]
    fn insufficient_stock_message_names_quantities() {
        let item: ItemId = "sku-9".parse().unwrap();
        let msg = DomainError::insufficient_stock(item, 3, 2).to_string();
        assert_eq!(
            msg,
            "insufficient stock for item sku-9: requested 3, available 2"
        );
    }
}
