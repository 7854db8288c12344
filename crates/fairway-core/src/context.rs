//! The simulation context.
//!
//! [`SimulationContext`] owns every piece of mutable scheduler state: the
//! clock, the roster, the round, the random stream, and the score model.
//! All mutation goes through three entry points, each of which runs to
//! completion: [`advance`](SimulationContext::advance),
//! [`submit_human_score`](SimulationContext::submit_human_score), and
//! [`set_manual_mode`](SimulationContext::set_manual_mode). Everything else
//! is a read-only snapshot.

use std::collections::BTreeSet;

use fairway_types::{
    LeaderboardRow, PairingId, PairingStatus, PairingStatusRow, PendingTurn, Player, PlayerId,
    StationOccupancy,
};
use tracing::{info, warn};

use crate::clock::SimClock;
use crate::config::{SchedulerParams, SimulationConfig};
use crate::leaderboard::{self, SessionBoard};
use crate::pairing::BuildError;
use crate::pairing_state::{Completion, HoleScorer, SubmitError, resume_suspended};
use crate::rng::SimRng;
use crate::roster::{RosterEntry, assemble_players};
use crate::round::RoundState;
use crate::score::{GaussianResolver, ScoreResolver};

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantError {
    /// The slot table does not have one entry per station, or the state
    /// table does not have one entry per pairing.
    #[error("table sizes disagree: {reason}")]
    Shape {
        /// Which tables disagree.
        reason: String,
    },

    /// A station names an occupant that is not active on that station.
    #[error("station {station} holds pairing {pairing}, which is not active there")]
    SlotMismatch {
        /// The station.
        station: usize,
        /// The recorded occupant.
        pairing: PairingId,
    },

    /// An active pairing does not own the slot of its current station.
    #[error("pairing {pairing} is active without holding its station")]
    UnslottedActive {
        /// The pairing.
        pairing: PairingId,
    },

    /// More than one pairing is awaiting input.
    #[error("{count} pairings are awaiting input")]
    MultipleAwaiting {
        /// Number of awaiting pairings.
        count: usize,
    },

    /// The pending turn does not match the awaiting pairing.
    #[error("pending turn does not match the awaiting pairing")]
    PendingMismatch,

    /// A queue-entry stamp is set on a pairing that is not queued, or
    /// missing on one that is.
    #[error("pairing {pairing} has an inconsistent queue entry")]
    QueueEntry {
        /// The pairing.
        pairing: PairingId,
    },

    /// A finished pairing has holes left, or a pairing past the last hole is
    /// not finished.
    #[error("pairing {pairing} has an inconsistent finish state")]
    Finish {
        /// The pairing.
        pairing: PairingId,
    },

    /// An active pairing lacks a finite countdown or its station metadata,
    /// or a pairing that holds no station has a countdown.
    #[error("pairing {pairing} has an inconsistent countdown")]
    Countdown {
        /// The pairing.
        pairing: PairingId,
    },

    /// Frozen turn metadata is missing on the awaiting pairing, or present
    /// on one that is not awaiting.
    #[error("pairing {pairing} has inconsistent awaiting metadata")]
    Awaiting {
        /// The pairing.
        pairing: PairingId,
    },

    /// The pairings do not hold exactly the live roster.
    #[error("pairings do not partition the roster")]
    Roster,
}

/// Owner of all scheduler state.
pub struct SimulationContext {
    pub(crate) params: SchedulerParams,
    pub(crate) clock: SimClock,
    pub(crate) roster: Vec<Player>,
    pub(crate) human: Option<PlayerId>,
    pub(crate) manual_mode: bool,
    pub(crate) round: RoundState,
    pub(crate) rng: SimRng,
    pub(crate) resolver: Box<dyn ScoreResolver>,
    pub(crate) session_board: SessionBoard,
}

impl core::fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulationContext")
            .field("now", &self.clock.now())
            .field("round", &self.round.number)
            .field("players", &self.roster.len())
            .field("manual_mode", &self.manual_mode)
            .finish_non_exhaustive()
    }
}

impl SimulationContext {
    /// Start a tournament at time zero with round 1 initialized.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the parameters fail
    /// [`SchedulerParams::validate`] or the roster is empty.
    pub fn new(
        params: SchedulerParams,
        roster: Vec<Player>,
        human: Option<PlayerId>,
        manual_mode: bool,
        seed: u64,
        resolver: Box<dyn ScoreResolver>,
    ) -> Result<Self, BuildError> {
        params.validate()?;
        let mut rng = SimRng::from_seed(seed);
        let ids: Vec<PlayerId> = roster.iter().map(|p| p.id).collect();
        let round = RoundState::initialize(1, &ids, &params, 0.0, &mut rng)?;

        info!(
            players = roster.len(),
            stations = params.station_count(),
            seed,
            manual_mode,
            "Simulation created"
        );

        Ok(Self {
            params,
            clock: SimClock::new(),
            roster,
            human,
            manual_mode,
            round,
            rng,
            resolver,
            session_board: SessionBoard::new(),
        })
    }

    /// Start a tournament from configuration and roster entries, with the
    /// configured human placed first and the default score model.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if pairings cannot be built.
    pub fn from_config(
        config: &SimulationConfig,
        entries: &[RosterEntry],
    ) -> Result<Self, BuildError> {
        let (players, human) = assemble_players(
            &config.session.human_name,
            config.session.human_skill,
            entries,
        );
        Self::new(
            config.scheduler_params(),
            players,
            Some(human),
            config.session.manual_mode,
            config.world.seed,
            Box::new(GaussianResolver::from_config(&config.scoring)),
        )
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current virtual time.
    pub const fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Scheduler parameters.
    pub const fn params(&self) -> &SchedulerParams {
        &self.params
    }

    /// Live roster in roster order.
    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    /// The human player, if there is one.
    pub const fn human(&self) -> Option<PlayerId> {
        self.human
    }

    /// Whether the human plays their own holes.
    pub const fn manual_mode(&self) -> bool {
        self.manual_mode
    }

    /// Current round state.
    pub const fn round_state(&self) -> &RoundState {
        &self.round
    }

    /// Current round number.
    pub const fn round_number(&self) -> u32 {
        self.round.number
    }

    /// Whether the human was removed by the cut.
    pub const fn is_human_eliminated(&self) -> bool {
        self.round.human_eliminated
    }

    /// Whether the last round has finished.
    pub const fn is_tournament_complete(&self) -> bool {
        self.round.tournament_complete
    }

    /// Best finishers across tournaments completed in this session.
    pub const fn session_board(&self) -> &SessionBoard {
        &self.session_board
    }

    /// Seed of the random stream.
    pub const fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Report and clear the round-restarted flag.
    pub const fn take_round_restarted(&mut self) -> bool {
        let restarted = self.round.restarted;
        self.round.restarted = false;
        restarted
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Ranked leaderboard of the live roster.
    pub fn leaderboard(&self) -> Vec<LeaderboardRow> {
        leaderboard::rank(&self.roster)
    }

    /// Occupancy of every station.
    pub fn station_occupancy(&self) -> Vec<StationOccupancy> {
        self.round
            .slots
            .iter()
            .enumerate()
            .map(|(idx, occupant)| StationOccupancy {
                station: u8::try_from(idx).unwrap_or(u8::MAX),
                occupant: *occupant,
                remaining: occupant
                    .and_then(|id| self.round.state(id))
                    .and_then(|s| s.timer),
            })
            .collect()
    }

    /// Scheduling view of every pairing.
    pub fn pairing_statuses(&self) -> Vec<PairingStatusRow> {
        self.round
            .pairings
            .iter()
            .zip(&self.round.states)
            .map(|(pairing, state)| PairingStatusRow {
                pairing: pairing.id,
                status: state.status,
                next_station: state.next_station,
                queue_entry: state.queue_entry,
                tee_time: state.tee_time,
            })
            .collect()
    }

    /// The outstanding human turn.
    pub const fn pending_turn(&self) -> Option<PendingTurn> {
        self.round.pending.current().copied()
    }

    /// Pairing holding the human this round.
    pub fn human_pairing(&self) -> Option<PairingId> {
        self.human.and_then(|h| self.round.pairing_of(h))
    }

    // -----------------------------------------------------------------------
    // Human input
    // -----------------------------------------------------------------------

    /// Whether a pairing containing the human should park at the end of a
    /// hole instead of being scored.
    pub(crate) const fn suspend_for(&self) -> Option<PlayerId> {
        if self.manual_mode && !self.round.human_eliminated {
            self.human
        } else {
            None
        }
    }

    /// Apply the human's score for the outstanding turn.
    ///
    /// The human gets `strokes`; the other members are scored by the
    /// resolver. The pairing is re-queued (or finished) at the current time.
    ///
    /// # Errors
    ///
    /// Returns a [`SubmitError`] if no turn is outstanding, `pairing` is not
    /// the awaiting pairing, or `strokes` is outside `1..=max`. Nothing is
    /// changed on error.
    pub fn submit_human_score(
        &mut self,
        pairing: PairingId,
        strokes: u8,
    ) -> Result<Completion, SubmitError> {
        let Some(turn) = self.pending_turn() else {
            warn!(pairing = %pairing, "Score submitted with no turn outstanding");
            return Err(SubmitError::NoPendingTurn);
        };
        if turn.pairing != pairing {
            warn!(
                expected = %turn.pairing,
                submitted = %pairing,
                "Score submitted for the wrong pairing"
            );
            return Err(SubmitError::WrongPairing {
                expected: turn.pairing,
                submitted: pairing,
            });
        }
        let max = self.resolver.max_strokes(turn.meta.par);
        if !(1..=max).contains(&strokes) {
            warn!(strokes, max, "Score out of range");
            return Err(SubmitError::InvalidStrokes { strokes, max });
        }
        let human = self.human.ok_or(SubmitError::NoPendingTurn)?;

        let completion = self
            .resume(turn.pairing, Some((human, strokes)))
            .ok_or(SubmitError::NoPendingTurn)?;
        info!(
            pairing = %pairing,
            station = turn.station,
            strokes,
            par = turn.meta.par,
            "Human score applied"
        );
        Ok(completion)
    }

    /// Switch manual play on or off.
    ///
    /// Turning it off while a turn is outstanding lets the resolver play
    /// the human's hole and releases the pairing. Returns that completion.
    pub fn set_manual_mode(&mut self, enabled: bool) -> Option<Completion> {
        self.manual_mode = enabled;
        info!(enabled, "Manual mode changed");
        if enabled {
            return None;
        }
        let turn = self.pending_turn()?;
        self.resume(turn.pairing, None)
    }

    fn resume(&mut self, pairing: PairingId, submitted: Option<(PlayerId, u8)>) -> Option<Completion> {
        let station_count = self.params.station_count();
        let now = self.clock.now();
        let mut scorer = HoleScorer {
            roster: &mut self.roster,
            resolver: self.resolver.as_ref(),
            rng: &mut self.rng,
        };
        resume_suspended(&mut self.round, pairing, &mut scorer, submitted, station_count, now)
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Verify the structural invariants of the current state.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantError`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let round = &self.round;
        let stations = self.params.station_count();

        if round.slots.len() != stations || round.difficulties.len() != stations {
            return Err(InvariantError::Shape {
                reason: format!(
                    "{} slots and {} difficulties for {stations} stations",
                    round.slots.len(),
                    round.difficulties.len()
                ),
            });
        }
        if round.states.len() != round.pairings.len() {
            return Err(InvariantError::Shape {
                reason: format!(
                    "{} states for {} pairings",
                    round.states.len(),
                    round.pairings.len()
                ),
            });
        }
        if round
            .pairings
            .iter()
            .enumerate()
            .any(|(idx, p)| p.id.index() != idx)
        {
            return Err(InvariantError::Shape {
                reason: "pairing ids do not follow build order".to_owned(),
            });
        }

        for (station, occupant) in round.slots.iter().enumerate() {
            let Some(id) = *occupant else {
                continue;
            };
            let valid = round.state(id).is_some_and(|s| {
                s.status == PairingStatus::Active && usize::from(s.next_station) == station
            });
            if !valid {
                return Err(InvariantError::SlotMismatch {
                    station,
                    pairing: id,
                });
            }
        }

        let mut awaiting = Vec::new();
        for (pairing, state) in round.pairings.iter().zip(&round.states) {
            let id = pairing.id;
            if state.status == PairingStatus::Active
                && round.slots.get(usize::from(state.next_station)).copied().flatten() != Some(id)
            {
                return Err(InvariantError::UnslottedActive { pairing: id });
            }
            let counting = if state.status == PairingStatus::Active {
                state.timer.is_some_and(f64::is_finite) && state.current.is_some()
            } else {
                state.timer.is_none()
            };
            if !counting {
                return Err(InvariantError::Countdown { pairing: id });
            }
            if state.awaiting.is_some() != (state.status == PairingStatus::AwaitingInput) {
                return Err(InvariantError::Awaiting { pairing: id });
            }
            if state.queue_entry.is_some() != (state.status == PairingStatus::Queued) {
                return Err(InvariantError::QueueEntry { pairing: id });
            }
            let past_end = usize::from(state.next_station) >= stations;
            if past_end != state.status.is_terminal() {
                return Err(InvariantError::Finish { pairing: id });
            }
            if state.status == PairingStatus::AwaitingInput {
                awaiting.push(id);
            }
        }

        if awaiting.len() > 1 {
            return Err(InvariantError::MultipleAwaiting {
                count: awaiting.len(),
            });
        }
        let pending = round.pending.current().map(|t| t.pairing);
        if pending != awaiting.first().copied() {
            return Err(InvariantError::PendingMismatch);
        }

        if !round.tournament_complete {
            let mut seen = BTreeSet::new();
            for member in round.pairings.iter().flat_map(|p| p.players.iter()) {
                if !seen.insert(*member) {
                    return Err(InvariantError::Roster);
                }
            }
            let live: BTreeSet<PlayerId> = self.roster.iter().map(|p| p.id).collect();
            if live.len() != self.roster.len() || seen != live {
                return Err(InvariantError::Roster);
            }
        }

        Ok(())
    }
}
