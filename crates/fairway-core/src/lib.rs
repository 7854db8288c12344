//! Virtual clock, station scheduler, and round management for the Fairway
//! darts-golf simulation.
//!
//! Pairings of players move through a fixed sequence of stations (holes).
//! Each station holds at most one pairing at a time; waiting pairings are
//! served first-come-first-served. A human player can play their own holes,
//! in which case their pairing parks at the end of each hole without holding
//! up anyone else.
//!
//! # Modules
//!
//! - [`clock`] -- Monotonic virtual clock.
//! - [`config`] -- Configuration loading from `fairway-config.yaml`.
//! - [`rng`] -- Seedable, resumable random stream.
//! - [`course`] -- Difficulty sequences and station metadata.
//! - [`score`] -- [`ScoreResolver`] trait and the default Gaussian model.
//! - [`roster`] -- Roster files and the built-in fallback roster.
//! - [`pairing`] -- Building pairings from a shuffled roster.
//! - [`tee_sheet`] -- Staggered tee times and releases.
//! - [`allocator`] -- FIFO station allocation.
//! - [`pairing_state`] -- Station completion and human-turn suspension.
//! - [`pending`] -- The single outstanding human turn and its recovery.
//! - [`leaderboard`] -- Ranking, the cut, and the session board.
//! - [`round`] -- Round state and round transitions.
//! - [`context`] -- [`SimulationContext`], the owner of all state.
//! - [`tick`] -- The per-tick phase sequence.
//! - [`snapshot`] -- JSON save files.
//! - [`runner`] -- Fast-forward driver.
//!
//! [`ScoreResolver`]: score::ScoreResolver
//! [`SimulationContext`]: context::SimulationContext

pub mod allocator;
pub mod clock;
pub mod config;
pub mod context;
pub mod course;
pub mod leaderboard;
pub mod pairing;
pub mod pairing_state;
pub mod pending;
pub mod rng;
pub mod roster;
pub mod round;
pub mod runner;
pub mod score;
pub mod snapshot;
pub mod tee_sheet;
pub mod tick;

pub use context::SimulationContext;
