//! Shared type definitions for the Fairway course scheduler.
//!
//! This crate is the single source of truth for the records shared between
//! the scheduler core, the driver binary, and any UI layer. Snapshot types
//! flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Dense, deterministic identifiers for players and pairings
//! - [`enums`] -- Station difficulty classes and the pairing lifecycle
//! - [`structs`] -- Players, pairings, runtime state, and snapshot rows

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Difficulty, PairingStatus};
pub use ids::{PairingId, PlayerId};
pub use structs::{
    HoleResult, LeaderboardRow, Pairing, PairingState, PairingStatusRow, PendingTurn, Player,
    StationMeta, StationOccupancy,
};
