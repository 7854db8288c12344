//! Fast-forward runner.
//!
//! [`fast_forward`] drives a context with fixed virtual steps until a stop
//! condition is met: the tournament ends, the human is asked for a score
//! (when pausing on turns), a new round starts (when stopping at round
//! boundaries), or the step budget runs out. A [`TickCallback`] sees every
//! tick, which is how the binary prints progress.

use tracing::info;

use crate::context::SimulationContext;
use crate::tick::{TickError, TickSummary};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last round finished.
    TournamentComplete,
    /// The human's pairing is waiting for a score.
    AwaitingInput,
    /// A new round was initialized.
    RoundRestarted,
    /// The step budget ran out.
    StepLimit,
}

/// Run controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    /// Virtual seconds per step.
    pub step: f64,
    /// Maximum number of steps.
    pub max_steps: u64,
    /// Stop as soon as a human turn is pending.
    pub pause_on_turn: bool,
    /// Stop when a new round starts.
    pub stop_at_round_end: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            step: 1.0,
            max_steps: 1_000_000,
            pause_on_turn: true,
            stop_at_round_end: false,
        }
    }
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// Why the run stopped.
    pub reason: StopReason,
    /// Steps executed.
    pub steps: u64,
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
}

/// Callback invoked after each tick.
pub trait TickCallback {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, ctx: &SimulationContext);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _ctx: &SimulationContext) {}
}

/// Step the simulation until a stop condition is met.
///
/// Conditions are checked before the first step as well, so calling this
/// with a turn already pending returns immediately.
///
/// # Errors
///
/// Returns [`RunnerError::Tick`] if a tick fails.
pub fn fast_forward(
    ctx: &mut SimulationContext,
    options: RunOptions,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let mut steps: u64 = 0;
    let mut final_summary = None;

    let reason = loop {
        if ctx.is_tournament_complete() {
            break StopReason::TournamentComplete;
        }
        if options.pause_on_turn && ctx.pending_turn().is_some() {
            break StopReason::AwaitingInput;
        }
        if steps >= options.max_steps {
            break StopReason::StepLimit;
        }

        let summary = ctx.advance(options.step)?;
        steps = steps.saturating_add(1);
        callback.on_tick(&summary, ctx);

        let restarted = summary
            .transition
            .as_ref()
            .is_some_and(|t| t.next_round.is_some());
        final_summary = Some(summary);
        if options.stop_at_round_end && restarted {
            break StopReason::RoundRestarted;
        }
    };

    info!(
        reason = ?reason,
        steps,
        now = ctx.now(),
        round = ctx.round_number(),
        "Fast-forward stopped"
    );
    Ok(RunResult {
        reason,
        steps,
        final_summary,
    })
}
