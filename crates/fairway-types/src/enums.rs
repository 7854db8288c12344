//! Enumeration types for the Fairway scheduler.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Station difficulty
// ---------------------------------------------------------------------------

/// Difficulty class of a station (hole).
///
/// The class fixes the hole's par and scales how long a pairing occupies the
/// station. Ordering follows increasing difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Difficulty {
    /// A par-3 hole.
    Short,
    /// A par-4 hole.
    Medium,
    /// A par-5 hole.
    Long,
}

impl Difficulty {
    /// Every difficulty class, easiest first.
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];

    /// Par for a hole of this class.
    pub const fn par(self) -> u8 {
        match self {
            Self::Short => 3,
            Self::Medium => 4,
            Self::Long => 5,
        }
    }

    /// Map a par value back to its class, if it names one.
    pub const fn from_par(par: u8) -> Option<Self> {
        match par {
            3 => Some(Self::Short),
            4 => Some(Self::Medium),
            5 => Some(Self::Long),
            _ => None,
        }
    }
}

impl core::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------
// Pairing lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle status of a pairing within one round.
///
/// ```text
/// PreRelease -> Queued -> Active -> (AwaitingInput)? -> Queued -> ... -> Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum PairingStatus {
    /// Waiting for its tee time; no station assigned.
    PreRelease,
    /// Eligible for allocation to its next station.
    Queued,
    /// Occupying exactly one station with a running countdown.
    Active,
    /// Frozen until the human player's score arrives; holds no station.
    AwaitingInput,
    /// Every station of the round has been played.
    Finished,
}

impl PairingStatus {
    /// Whether the pairing has nothing left to play this round.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }
}
