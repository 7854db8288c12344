//! Save files.
//!
//! A [`SavedSimulation`] is the full durable state of a context: parameters,
//! clock, random-stream position, roster, round state and session board.
//! It is written as JSON. Loading validates the version and structure,
//! then rebuilds the pending human turn from the saved pairing states
//! rather than trusting the saved turn, so a reloaded game never loses or
//! duplicates a pending decision.

use chrono::{DateTime, Utc};
use fairway_types::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clock::{ClockError, SimClock};
use crate::config::{ParamsError, SchedulerParams};
use crate::context::{InvariantError, SimulationContext};
use crate::leaderboard::SessionBoard;
use crate::pending::RecoveryError;
use crate::rng::{RngState, SimRng};
use crate::round::RoundState;
use crate::score::ScoreResolver;

/// Current save-file format version.
pub const SAVE_VERSION: u32 = 1;

/// Errors that can occur when exporting or importing a save.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The JSON could not be read or written (including missing fields).
    #[error("save file JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The save was written by an unknown format version.
    #[error("unsupported save version {found} (expected {SAVE_VERSION})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
    },

    /// The saved scheduler parameters cannot be run with.
    #[error("invalid saved parameters: {source}")]
    Params {
        /// The offending parameter.
        #[from]
        source: ParamsError,
    },

    /// The saved clock value is invalid.
    #[error("invalid saved clock: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// The saved state breaks a scheduler invariant.
    #[error("inconsistent save: {source}")]
    Inconsistent {
        /// The violated invariant.
        #[from]
        source: InvariantError,
    },

    /// The pending human turn could not be recovered.
    #[error("pending turn recovery failed: {source}")]
    Recovery {
        /// The underlying recovery error.
        #[from]
        source: RecoveryError,
    },
}

/// Durable state of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSimulation {
    /// Format version.
    pub version: u32,
    /// Wall-clock time the save was written.
    pub saved_at: DateTime<Utc>,
    /// Scheduler parameters the game was started with.
    pub params: SchedulerParams,
    /// Virtual time.
    pub clock: f64,
    /// Random stream position.
    pub rng: RngState,
    /// Live roster.
    pub roster: Vec<Player>,
    /// The human player.
    pub human: Option<PlayerId>,
    /// Manual play flag.
    pub manual_mode: bool,
    /// Round in progress.
    pub round: RoundState,
    /// Session best finishers.
    pub session_board: SessionBoard,
}

impl SimulationContext {
    /// Capture the durable state.
    pub fn save(&self) -> SavedSimulation {
        SavedSimulation {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            params: self.params.clone(),
            clock: self.clock.now(),
            rng: self.rng.state(),
            roster: self.roster.clone(),
            human: self.human,
            manual_mode: self.manual_mode,
            round: self.round.clone(),
            session_board: self.session_board.clone(),
        }
    }

    /// Serialize the durable state as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if serialization fails.
    pub fn export(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.save())?)
    }

    /// Rebuild a context from a saved state.
    ///
    /// The pending turn is recovered from the pairing states; a saved turn
    /// that disagrees with them is rejected.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] for an unknown version, unrunnable
    /// parameters, an invalid clock, a broken invariant, or an unrecoverable
    /// pending turn.
    pub fn restore(
        saved: SavedSimulation,
        resolver: Box<dyn ScoreResolver>,
    ) -> Result<Self, SnapshotError> {
        if saved.version != SAVE_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: saved.version,
            });
        }
        saved.params.validate()?;
        let clock = SimClock::from_value(saved.clock)?;

        let mut round = saved.round;
        let saved_turn = round.pending.current().copied();
        let recovered = round
            .pending
            .recover(&round.pairings, &round.states, saved.human)?;
        if recovered != saved_turn {
            return Err(SnapshotError::Inconsistent {
                source: InvariantError::PendingMismatch,
            });
        }

        let ctx = Self {
            params: saved.params,
            clock,
            roster: saved.roster,
            human: saved.human,
            manual_mode: saved.manual_mode,
            round,
            rng: SimRng::restore(saved.rng),
            resolver,
            session_board: saved.session_board,
        };
        ctx.check_invariants()?;

        info!(
            now = ctx.clock.now(),
            round = ctx.round.number,
            players = ctx.roster.len(),
            pending = recovered.is_some(),
            "Simulation restored"
        );
        Ok(ctx)
    }

    /// Parse a JSON save and rebuild a context from it.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] for malformed JSON or missing fields,
    /// otherwise the errors of [`restore`](Self::restore).
    pub fn import(json: &str, resolver: Box<dyn ScoreResolver>) -> Result<Self, SnapshotError> {
        let saved: SavedSimulation = serde_json::from_str(json)?;
        Self::restore(saved, resolver)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fairway_types::{Difficulty, PairingStatus};

    use super::*;
    use crate::score::GaussianResolver;

    fn context(manual: bool) -> SimulationContext {
        let params = SchedulerParams {
            course: vec![Difficulty::Short, Difficulty::Medium, Difficulty::Short],
            ..SchedulerParams::default()
        };
        let roster: Vec<Player> = (0..6)
            .map(|i| Player::new(PlayerId::new(i), format!("P{i}"), 10))
            .collect();
        SimulationContext::new(
            params,
            roster,
            Some(PlayerId::new(0)),
            manual,
            3,
            Box::new(GaussianResolver::default()),
        )
        .unwrap()
    }

    fn run_until_pending(ctx: &mut SimulationContext) {
        for _ in 0..500 {
            if ctx.pending_turn().is_some() {
                return;
            }
            let _ = ctx.advance(1.0).unwrap();
        }
    }

    fn resolver() -> Box<dyn ScoreResolver> {
        Box::new(GaussianResolver::default())
    }

    #[test]
    fn export_import_preserves_state() {
        let mut ctx = context(false);
        for _ in 0..10 {
            let _ = ctx.advance(1.3).unwrap();
        }
        let json = ctx.export().unwrap();
        let restored = SimulationContext::import(&json, resolver()).unwrap();
        assert!((restored.now() - ctx.now()).abs() < 1e-9);
        assert_eq!(restored.roster(), ctx.roster());
        assert_eq!(restored.round_state(), ctx.round_state());
        assert_eq!(restored.rng.state(), ctx.rng.state());
    }

    #[test]
    fn pending_turn_survives_reload() {
        let mut ctx = context(true);
        run_until_pending(&mut ctx);
        let turn = ctx.pending_turn().unwrap();
        let restored = SimulationContext::import(&ctx.export().unwrap(), resolver()).unwrap();
        assert_eq!(restored.pending_turn(), Some(turn));
    }

    #[test]
    fn missing_fields_fail_to_parse() {
        let result = SimulationContext::import(r#"{"version": 1}"#, resolver());
        assert!(matches!(result, Err(SnapshotError::Json { .. })));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut saved = context(false).save();
        saved.version = 99;
        let result = SimulationContext::restore(saved, resolver());
        assert!(matches!(
            result,
            Err(SnapshotError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn slot_pointing_at_queued_pairing_is_rejected() {
        let mut saved = context(false).save();
        if let Some(slot) = saved.round.slots.get_mut(0) {
            *slot = Some(fairway_types::PairingId::new(0));
        }
        let result = SimulationContext::restore(saved, resolver());
        assert!(matches!(result, Err(SnapshotError::Inconsistent { .. })));
    }

    #[test]
    fn awaiting_pairing_without_saved_turn_is_rejected() {
        let mut ctx = context(true);
        run_until_pending(&mut ctx);
        let mut saved = ctx.save();
        let _ = saved.round.pending.clear();
        let result = SimulationContext::restore(saved, resolver());
        assert!(matches!(result, Err(SnapshotError::Inconsistent { .. })));
    }

    #[test]
    fn negative_clock_is_rejected() {
        let mut saved = context(false).save();
        saved.clock = -4.0;
        let result = SimulationContext::restore(saved, resolver());
        assert!(matches!(result, Err(SnapshotError::Clock { .. })));
    }

    #[test]
    fn two_awaiting_pairings_fail_recovery() {
        let mut saved = context(false).save();
        for state in &mut saved.round.states {
            state.status = PairingStatus::AwaitingInput;
            state.queue_entry = None;
        }
        let result = SimulationContext::restore(saved, resolver());
        assert!(matches!(result, Err(SnapshotError::Recovery { .. })));
    }

    #[test]
    fn unrunnable_saved_params_are_rejected() {
        let base = context(false).save();
        let edits: [fn(&mut SchedulerParams); 5] = [
            |p| p.completion_batch_limit = 0,
            |p| p.pairing_size = 7,
            |p| p.course.clear(),
            |p| p.pace_base_secs = f64::NAN,
            |p| p.cut_size = 0,
        ];
        for edit in edits {
            let mut saved = base.clone();
            edit(&mut saved.params);
            let result = SimulationContext::restore(saved, resolver());
            assert!(matches!(result, Err(SnapshotError::Params { .. })));
        }
    }

    #[test]
    fn active_pairing_without_countdown_is_rejected() {
        let mut ctx = context(false);
        let _ = ctx.advance(0.5).unwrap();
        let mut saved = ctx.save();
        let state = saved.round.states.first_mut().unwrap();
        assert_eq!(state.status, PairingStatus::Active);
        state.timer = None;
        let result = SimulationContext::restore(saved, resolver());
        assert!(matches!(
            result,
            Err(SnapshotError::Inconsistent {
                source: InvariantError::Countdown { .. }
            })
        ));
    }

    #[test]
    fn duplicated_roster_entry_is_rejected() {
        let mut saved = context(false).save();
        let twin = saved.roster.first().cloned().unwrap();
        saved.roster.push(twin);
        let result = SimulationContext::restore(saved, resolver());
        assert!(matches!(
            result,
            Err(SnapshotError::Inconsistent {
                source: InvariantError::Roster
            })
        ));
    }
}
