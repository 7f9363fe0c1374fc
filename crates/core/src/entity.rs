//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Inventory records keep their identity while quantities move between
/// available and reserved; reservations keep theirs until removed from the ledger.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
