//! Core records for the Fairway scheduler.
//!
//! Covers players and their per-hole results, pairings and their runtime
//! state, the pending human turn, and the read-only snapshot rows handed to
//! callers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Difficulty, PairingStatus};
use crate::ids::{PairingId, PlayerId};

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// Result of one player on one hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HoleResult {
    /// Round the hole was played in (1-based).
    pub round: u32,
    /// Hole index within the round (0-based).
    pub hole: u8,
    /// Difficulty class of the hole.
    pub difficulty: Difficulty,
    /// Par of the hole.
    pub par: u8,
    /// Strokes taken.
    pub strokes: u8,
    /// `strokes - par`.
    pub par_delta: i32,
}

impl HoleResult {
    /// Build a result, deriving the par delta from strokes and par.
    pub fn new(round: u32, meta: &StationMeta, strokes: u8) -> Self {
        Self {
            round,
            hole: meta.hole,
            difficulty: meta.difficulty,
            par: meta.par,
            strokes,
            par_delta: i32::from(strokes).saturating_sub(i32::from(meta.par)),
        }
    }
}

/// A competitor on the roster.
///
/// Players persist across rounds unless removed by the cut. Results are only
/// ever appended by station completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Roster identifier.
    pub id: PlayerId,
    /// Display name, unique on the roster (case-insensitive).
    pub name: String,
    /// Skill level from 1 (best) to 20.
    pub skill: u8,
    /// Every hole played so far, across all rounds, in play order.
    pub results: Vec<HoleResult>,
    /// Holes completed in the current round.
    pub holes_completed: u32,
    /// Current round number (1-based).
    pub round: u32,
}

impl Player {
    /// Create a player with no results, entering round 1.
    pub const fn new(id: PlayerId, name: String, skill: u8) -> Self {
        Self {
            id,
            name,
            skill,
            results: Vec::new(),
            holes_completed: 0,
            round: 1,
        }
    }

    /// Total strokes across every recorded hole.
    pub fn total_strokes(&self) -> u32 {
        self.results
            .iter()
            .fold(0_u32, |acc, r| acc.saturating_add(u32::from(r.strokes)))
    }

    /// Cumulative score relative to par across every recorded hole.
    pub fn par_delta(&self) -> i32 {
        self.results
            .iter()
            .fold(0_i32, |acc, r| acc.saturating_add(r.par_delta))
    }

    /// Number of holes played across every round.
    pub fn stations_completed(&self) -> u32 {
        u32::try_from(self.results.len()).unwrap_or(u32::MAX)
    }
}

// ---------------------------------------------------------------------------
// Pairings
// ---------------------------------------------------------------------------

/// A group of players progressing through the course together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Pairing {
    /// Identifier, equal to the pairing's build order.
    pub id: PairingId,
    /// Members in pairing order.
    pub players: Vec<PlayerId>,
}

impl Pairing {
    /// Whether `player` is a member of this pairing.
    pub fn contains(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }
}

/// Metadata generated when a pairing is assigned to a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StationMeta {
    /// Hole index within the round (0-based).
    pub hole: u8,
    /// Difficulty class drawn for this hole in this round.
    pub difficulty: Difficulty,
    /// Par of the hole.
    pub par: u8,
    /// Dartboard target for this attempt (1..=20).
    pub target: u8,
}

/// Runtime state of one pairing within a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PairingState {
    /// Lifecycle status.
    pub status: PairingStatus,
    /// Index of the next hole to play.
    pub next_station: u8,
    /// Seconds of virtual time left on the current station; `None` when no
    /// countdown is running.
    pub timer: Option<f64>,
    /// Virtual time the pairing entered the queue; set only while queued.
    pub queue_entry: Option<f64>,
    /// Virtual time the pairing is released onto the course.
    pub tee_time: f64,
    /// Metadata of the station currently (or most recently) assigned.
    pub current: Option<StationMeta>,
    /// Frozen metadata of a suspended human turn.
    pub awaiting: Option<StationMeta>,
}

impl PairingState {
    /// A fresh state waiting for `tee_time`.
    pub const fn pre_release(tee_time: f64) -> Self {
        Self {
            status: PairingStatus::PreRelease,
            next_station: 0,
            timer: None,
            queue_entry: None,
            tee_time,
            current: None,
            awaiting: None,
        }
    }
}

/// The single outstanding request for a human score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PendingTurn {
    /// Suspended pairing.
    pub pairing: PairingId,
    /// Hole index awaiting a score.
    pub station: u8,
    /// Frozen station metadata.
    pub meta: StationMeta,
}

// ---------------------------------------------------------------------------
// Snapshot rows
// ---------------------------------------------------------------------------

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardRow {
    /// 1-based rank in sort order.
    pub position: u32,
    /// Player name.
    pub name: String,
    /// Holes played across every round.
    pub stations_completed: u32,
    /// Total strokes.
    pub total_strokes: u32,
    /// Cumulative score relative to par.
    pub par_delta: i32,
}

/// Occupancy of one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StationOccupancy {
    /// Hole index (0-based).
    pub station: u8,
    /// Occupying pairing, if any.
    pub occupant: Option<PairingId>,
    /// Remaining countdown of the occupant.
    pub remaining: Option<f64>,
}

/// Scheduling view of one pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PairingStatusRow {
    /// Pairing identifier.
    pub pairing: PairingId,
    /// Lifecycle status.
    pub status: PairingStatus,
    /// Index of the next hole to play.
    pub next_station: u8,
    /// Queue-entry time while queued.
    pub queue_entry: Option<f64>,
    /// Tee time.
    pub tee_time: f64,
}
