//! Landscape domain model.
//!
//! # Responsibility
//! - Define identity, items, groups and the landscape aggregate.
//! - Keep group membership expressed as an index, not back-pointers.
//!
//! # Invariants
//! - Items are addressed by `FullyQualifiedIdentifier` only.
//! - Group membership is owned by `Landscape`.

pub mod group;
pub mod identity;
pub mod item;
pub mod landscape;
