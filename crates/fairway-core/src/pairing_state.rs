//! Pairing lifecycle transitions after a station countdown expires.
//!
//! ```text
//! pre-release -> queued -> active -> (awaiting-input)? -> queued -> ... -> finished
//! ```
//!
//! Completing a station frees the slot and records one result per member,
//! unless the pairing holds the human in manual mode, in which case the
//! pairing is parked until a score arrives and nothing is recorded. A parked
//! pairing is resumed exactly once.

use fairway_types::{
    HoleResult, Pairing, PairingId, PairingState, PairingStatus, PendingTurn, Player, PlayerId,
    StationMeta,
};
use rand::RngCore;
use tracing::debug;

use crate::round::RoundState;
use crate::score::ScoreResolver;

/// Errors returned when a submitted human score is rejected.
///
/// A rejected submission leaves the simulation unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// No human turn is outstanding.
    #[error("no turn is awaiting a score")]
    NoPendingTurn,

    /// The score names a pairing other than the one awaiting input.
    #[error("pairing {submitted} is not awaiting input (pairing {expected} is)")]
    WrongPairing {
        /// Pairing that is awaiting input.
        expected: PairingId,
        /// Pairing named by the caller.
        submitted: PairingId,
    },

    /// The stroke count is outside the accepted range.
    #[error("strokes {strokes} outside 1..={max}")]
    InvalidStrokes {
        /// Submitted strokes.
        strokes: u8,
        /// Highest accepted value for this hole.
        max: u8,
    },
}

/// Where a pairing went after finishing a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Back in the queue for the next hole.
    Requeued,
    /// Played the last hole of the round.
    Finished,
    /// Parked until the human submits a score.
    Suspended,
}

/// One station completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// The pairing that finished the station.
    pub pairing: PairingId,
    /// The station that was played.
    pub station: u8,
    /// What happened to the pairing.
    pub outcome: CompletionOutcome,
}

/// Borrowed pieces needed to score a hole.
pub struct HoleScorer<'a> {
    /// Live roster.
    pub roster: &'a mut [Player],
    /// Stroke model for non-submitted scores.
    pub resolver: &'a dyn ScoreResolver,
    /// Random source for the stroke model.
    pub rng: &'a mut dyn RngCore,
}

impl HoleScorer<'_> {
    /// Record one result per pairing member. `submitted` overrides the
    /// resolver for a single player.
    fn record(
        &mut self,
        pairing: &Pairing,
        meta: &StationMeta,
        round: u32,
        submitted: Option<(PlayerId, u8)>,
    ) {
        for &member in &pairing.players {
            let Some(player) = self.roster.iter_mut().find(|p| p.id == member) else {
                continue;
            };
            let strokes = match submitted {
                Some((id, strokes)) if id == member => strokes,
                _ => self
                    .resolver
                    .strokes(player.skill, meta.difficulty, meta.par, &mut *self.rng),
            };
            player.results.push(HoleResult::new(round, meta, strokes));
            player.holes_completed = player.holes_completed.saturating_add(1);
        }
    }
}

/// Move a pairing past the hole it just played.
fn leave_station(state: &mut PairingState, station_count: usize, now: f64) -> CompletionOutcome {
    state.next_station = state.next_station.saturating_add(1);
    state.timer = None;
    state.awaiting = None;
    if usize::from(state.next_station) >= station_count {
        state.status = PairingStatus::Finished;
        state.queue_entry = None;
        CompletionOutcome::Finished
    } else {
        state.status = PairingStatus::Queued;
        state.queue_entry = Some(now);
        CompletionOutcome::Requeued
    }
}

/// Complete the station held by `id`.
///
/// `suspend_for` is the human when manual play is on and the human is still
/// in the tournament; a pairing containing that player is parked instead of
/// scored. Returns `None` if the pairing is not active.
pub fn complete_station(
    round: &mut RoundState,
    id: PairingId,
    scorer: &mut HoleScorer<'_>,
    suspend_for: Option<PlayerId>,
    station_count: usize,
    now: f64,
) -> Option<Completion> {
    let pairing = round.pairing(id)?.clone();
    let state = round.states.get_mut(id.index())?;
    if state.status != PairingStatus::Active {
        return None;
    }
    let station = state.next_station;
    let meta = state.current?;

    if let Some(slot) = round
        .slots
        .get_mut(usize::from(station))
        .filter(|slot| **slot == Some(id))
    {
        *slot = None;
    }

    if suspend_for.is_some_and(|human| pairing.contains(human)) {
        state.status = PairingStatus::AwaitingInput;
        state.timer = None;
        state.awaiting = Some(meta);
        round.pending.record(PendingTurn {
            pairing: id,
            station,
            meta,
        });
        debug!(pairing = %id, station, "Pairing awaiting human score");
        return Some(Completion {
            pairing: id,
            station,
            outcome: CompletionOutcome::Suspended,
        });
    }

    let outcome = leave_station(state, station_count, now);
    scorer.record(&pairing, &meta, round.number, None);
    debug!(pairing = %id, station, outcome = ?outcome, "Station completed");
    Some(Completion {
        pairing: id,
        station,
        outcome,
    })
}

/// Resume a parked pairing.
///
/// `submitted` is the human's score; `None` lets the resolver play the
/// human's hole too. Clears the pending turn. Returns `None` if the pairing
/// is not awaiting input.
pub fn resume_suspended(
    round: &mut RoundState,
    id: PairingId,
    scorer: &mut HoleScorer<'_>,
    submitted: Option<(PlayerId, u8)>,
    station_count: usize,
    now: f64,
) -> Option<Completion> {
    let pairing = round.pairing(id)?.clone();
    let state = round.states.get_mut(id.index())?;
    if state.status != PairingStatus::AwaitingInput {
        return None;
    }
    let station = state.next_station;
    let meta = state.awaiting.or(state.current)?;

    let outcome = leave_station(state, station_count, now);
    let _ = round.pending.clear();
    scorer.record(&pairing, &meta, round.number, submitted);
    debug!(pairing = %id, station, outcome = ?outcome, "Suspended turn resolved");
    Some(Completion {
        pairing: id,
        station,
        outcome,
    })
}
