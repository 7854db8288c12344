//! The tick engine.
//!
//! One call to [`SimulationContext::advance`] moves virtual time forward and
//! runs a fixed sequence of phases:
//!
//! 1. **Clock**: validate and apply `dt`.
//! 2. **Release**: queue every pairing whose tee time has arrived.
//! 3. **Countdown**: subtract `dt` from every active timer.
//! 4. **Completion**: finish expired stations, most overdue first, up to the
//!    configured batch limit. The rest stay expired and go first next tick.
//! 5. **Allocation**: fill free stations from the queue, once.
//! 6. **Round check**: close the round if every player is done.
//!
//! A zero `dt` changes nothing.

use fairway_types::{PairingId, PairingStatus};
use tracing::{debug, trace};

use crate::allocator::{Allocation, allocate};
use crate::clock::{ClockError, SimClock};
use crate::context::SimulationContext;
use crate::pairing::BuildError;
use crate::pairing_state::{Completion, CompletionOutcome, HoleScorer, complete_station};
use crate::round::{RoundTransition, finish_round_if_complete};
use crate::tee_sheet::release_due;

/// Errors that can occur during a tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TickError {
    /// `dt` is negative or not finite. Nothing was changed.
    #[error("invalid time step {delta}: must be finite and non-negative")]
    InvalidDelta {
        /// The rejected step.
        delta: f64,
    },

    /// The next round could not be set up.
    #[error("round setup failed: {source}")]
    Round {
        /// The underlying build error.
        #[from]
        source: BuildError,
    },
}

impl From<ClockError> for TickError {
    fn from(err: ClockError) -> Self {
        match err {
            ClockError::InvalidDelta { delta } | ClockError::InvalidValue { value: delta } => {
                Self::InvalidDelta { delta }
            }
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Virtual time after the tick.
    pub now: f64,
    /// Round number after the tick.
    pub round: u32,
    /// Pairings released from the tee sheet.
    pub released: Vec<PairingId>,
    /// Station completions, in processing order.
    pub completed: Vec<Completion>,
    /// Station assignments.
    pub allocations: Vec<Allocation>,
    /// Expired stations left for the next tick by the batch limit.
    pub deferred: usize,
    /// The round transition, if the round ended.
    pub transition: Option<RoundTransition>,
}

impl TickSummary {
    /// Whether the human's pairing was parked during this tick.
    pub fn suspended(&self) -> Option<PairingId> {
        self.completed
            .iter()
            .find(|c| c.outcome == CompletionOutcome::Suspended)
            .map(|c| c.pairing)
    }
}

impl SimulationContext {
    /// Advance virtual time by `dt` seconds and run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::InvalidDelta`] for a negative or non-finite
    /// `dt`, leaving the state untouched, or [`TickError::Round`] if the
    /// next round cannot be built.
    pub fn advance(&mut self, dt: f64) -> Result<TickSummary, TickError> {
        SimClock::validate_delta(dt)?;
        if dt <= 0.0 {
            return Ok(TickSummary {
                now: self.clock.now(),
                round: self.round.number,
                ..TickSummary::default()
            });
        }

        let now = self.clock.advance(dt)?;

        // --- Release ---
        let released = release_due(&mut self.round.states, now);

        // --- Countdown ---
        for state in &mut self.round.states {
            if state.status == PairingStatus::Active {
                state.timer = state.timer.map(|t| t - dt);
            }
        }

        // --- Completion ---
        let mut ready: Vec<(f64, u8, PairingId)> = self
            .round
            .states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status == PairingStatus::Active)
            .filter_map(|(idx, s)| {
                let timer = s.timer?;
                (timer <= 0.0).then(|| {
                    (
                        timer,
                        s.next_station,
                        PairingId::new(u32::try_from(idx).unwrap_or(u32::MAX)),
                    )
                })
            })
            .collect();
        ready.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let limit = self.params.completion_batch_limit;
        let deferred = ready.len().saturating_sub(limit);
        let suspend_for = self.suspend_for();
        let station_count = self.params.station_count();

        let mut completed = Vec::with_capacity(ready.len().min(limit));
        {
            let mut scorer = HoleScorer {
                roster: &mut self.roster,
                resolver: self.resolver.as_ref(),
                rng: &mut self.rng,
            };
            for &(_, _, id) in ready.iter().take(limit) {
                if let Some(done) = complete_station(
                    &mut self.round,
                    id,
                    &mut scorer,
                    suspend_for,
                    station_count,
                    now,
                ) {
                    completed.push(done);
                }
            }
        }
        if deferred > 0 {
            debug!(deferred, limit, now, "Completion backlog carried to next tick");
        }

        // --- Allocation ---
        let allocations = allocate(&mut self.round, &self.params, &mut self.rng);

        // --- Round check ---
        let transition = finish_round_if_complete(
            &mut self.round,
            &mut self.roster,
            self.human,
            &self.params,
            now,
            &mut self.rng,
            &mut self.session_board,
        )?;

        trace!(
            now,
            released = released.len(),
            completed = completed.len(),
            allocated = allocations.len(),
            "Tick complete"
        );

        Ok(TickSummary {
            now,
            round: self.round.number,
            released,
            completed,
            allocations,
            deferred,
            transition,
        })
    }
}
