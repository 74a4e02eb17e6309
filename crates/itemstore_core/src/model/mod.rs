//! Domain model for the item catalog.
//!
//! # Responsibility
//! - Define the single persisted entity and its field constraints.
//! - Keep validation pure so it can run before any store access.
//!
//! # Invariants
//! - Every item is identified by a caller-supplied integer `ItemId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod item;
