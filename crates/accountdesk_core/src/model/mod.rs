//! Domain model for accounts and groups.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Attach lifecycle metadata (audit stamps, soft-delete tombstones).
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Account deletion is represented by soft-delete tombstones, not hard delete.

pub mod account;
pub mod group;
pub mod lifecycle;
