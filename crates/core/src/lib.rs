//! `stockhold-core` — shared building blocks for the reservation domain.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the entity trait, and the error taxonomy every layer reports with.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ItemId, ReservationId};
