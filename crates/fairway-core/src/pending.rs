//! The single outstanding human decision.
//!
//! When the human's pairing finishes a hole in manual mode, the pairing is
//! parked in [`PairingStatus::AwaitingInput`] and a [`PendingTurn`] is held
//! here until a score is submitted. The pairing state itself keeps a frozen
//! copy of the station metadata, so after a reload the broker can rebuild the
//! pending turn from durable state instead of replaying ticks.

use fairway_types::{Pairing, PairingId, PairingState, PairingStatus, PendingTurn, PlayerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Errors raised when durable state cannot yield a consistent pending turn.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoveryError {
    /// More than one pairing is waiting for input.
    #[error("{count} pairings are awaiting input; at most one is allowed")]
    MultipleAwaiting {
        /// Number of awaiting pairings found.
        count: usize,
    },

    /// The awaiting pairing does not contain the human player.
    #[error("pairing {pairing} is awaiting input but does not contain the human player")]
    NotHumanPairing {
        /// The offending pairing.
        pairing: PairingId,
    },

    /// The awaiting pairing has no frozen station metadata.
    #[error("pairing {pairing} is awaiting input without frozen station metadata")]
    MissingSnapshot {
        /// The offending pairing.
        pairing: PairingId,
    },
}

/// Holder of at most one [`PendingTurn`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTurnBroker {
    turn: Option<PendingTurn>,
}

impl PendingTurnBroker {
    /// An empty broker.
    pub const fn new() -> Self {
        Self { turn: None }
    }

    /// The outstanding turn, if any.
    pub const fn current(&self) -> Option<&PendingTurn> {
        self.turn.as_ref()
    }

    /// Whether a turn is outstanding.
    pub const fn is_pending(&self) -> bool {
        self.turn.is_some()
    }

    /// Record a new pending turn.
    pub fn record(&mut self, turn: PendingTurn) {
        if let Some(previous) = self.turn.replace(turn) {
            warn!(
                previous = %previous.pairing,
                pairing = %turn.pairing,
                "Pending turn replaced while one was outstanding"
            );
        }
        debug!(pairing = %turn.pairing, station = turn.station, "Pending turn recorded");
    }

    /// Remove and return the outstanding turn.
    pub const fn clear(&mut self) -> Option<PendingTurn> {
        self.turn.take()
    }

    /// Rebuild the pending turn from pairing states.
    ///
    /// Scans for a pairing in `AwaitingInput` that contains `human` and
    /// rebuilds the turn from its frozen metadata. Calling this repeatedly
    /// yields the same result and never scores anything.
    ///
    /// # Errors
    ///
    /// Returns a [`RecoveryError`] if more than one pairing is awaiting
    /// input, or the awaiting pairing is not the human's, or it has lost its
    /// frozen metadata. The broker is left unchanged on error.
    pub fn recover(
        &mut self,
        pairings: &[Pairing],
        states: &[PairingState],
        human: Option<PlayerId>,
    ) -> Result<Option<PendingTurn>, RecoveryError> {
        let awaiting: Vec<(usize, &PairingState)> = states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status == PairingStatus::AwaitingInput)
            .collect();

        if awaiting.len() > 1 {
            return Err(RecoveryError::MultipleAwaiting {
                count: awaiting.len(),
            });
        }

        let Some(&(idx, state)) = awaiting.first() else {
            self.turn = None;
            return Ok(None);
        };

        let pairing = PairingId::new(u32::try_from(idx).unwrap_or(u32::MAX));
        let is_human = pairings
            .get(idx)
            .zip(human)
            .is_some_and(|(p, h)| p.contains(h));
        if !is_human {
            return Err(RecoveryError::NotHumanPairing { pairing });
        }

        let meta = state
            .awaiting
            .ok_or(RecoveryError::MissingSnapshot { pairing })?;

        let turn = PendingTurn {
            pairing,
            station: meta.hole,
            meta,
        };
        self.turn = Some(turn);
        Ok(Some(turn))
    }
}
