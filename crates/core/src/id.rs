//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a catalogue item (the record store key).
///
/// Item keys come from the catalogue and are opaque strings; the only rule
/// enforced here is that they are not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(DomainError::invalid_argument("ItemId: cannot be blank"));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ItemId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.trim().is_empty() {
            return Err(DomainError::invalid_argument("ItemId: cannot be blank"));
        }
        Ok(Self(value))
    }
}

/// Identifier of a reservation (a time-bounded stock hold).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_argument(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(ReservationId, "ReservationId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_item_id_is_rejected() {
        assert!(matches!(
            "  ".parse::<ItemId>(),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(ItemId::try_from(String::new()).is_err());
    }

    #[test]
    fn item_id_serializes_transparently() {
        let id: ItemId = "sku-42".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"sku-42\"");
        assert_eq!(id.to_string(), "sku-42");
    }

    #[test]
    fn reservation_ids_are_unique_and_parse_back() {
        let a = ReservationId::new();
        let b = ReservationId::new();
        assert_ne!(a, b);

        let parsed: ReservationId = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn malformed_reservation_id_is_invalid_argument() {
        let err = "not-a-uuid".parse::<ReservationId>().unwrap_err();
        match err {
            DomainError::InvalidArgument(msg) => assert!(msg.starts_with("ReservationId")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
