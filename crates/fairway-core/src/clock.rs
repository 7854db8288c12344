//! Virtual simulation clock.
//!
//! The clock is the single source of truth for simulation time. Time is a
//! non-negative number of virtual seconds and only ever moves forward, in
//! finite, non-negative steps. Nothing else in the scheduler stores "now";
//! tee releases, queue-entry stamps and countdowns all read it from here.

use serde::{Deserialize, Serialize};

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    /// The requested step is negative, NaN, or infinite.
    #[error("invalid time delta {delta}: must be finite and non-negative")]
    InvalidDelta {
        /// The rejected delta.
        delta: f64,
    },

    /// A restored clock value is negative or not finite.
    #[error("invalid clock value {value}")]
    InvalidValue {
        /// The rejected value.
        value: f64,
    },
}

/// Virtual clock measured in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    /// Current virtual time in seconds.
    now: f64,
}

impl SimClock {
    /// Create a clock at time zero.
    pub const fn new() -> Self {
        Self { now: 0.0 }
    }

    /// Restore a clock at a previously exported time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidValue`] if `now` is negative or not finite.
    pub const fn from_value(now: f64) -> Result<Self, ClockError> {
        if !now.is_finite() || now < 0.0 {
            return Err(ClockError::InvalidValue { value: now });
        }
        Ok(Self { now })
    }

    /// Check that `delta` is a legal step without advancing.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDelta`] if `delta` is negative or not
    /// finite.
    pub const fn validate_delta(delta: f64) -> Result<(), ClockError> {
        if delta.is_finite() && delta >= 0.0 {
            Ok(())
        } else {
            Err(ClockError::InvalidDelta { delta })
        }
    }

    /// Advance the clock by `delta` seconds. Returns the new time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDelta`] if `delta` is negative or not
    /// finite; the clock is left unchanged.
    pub fn advance(&mut self, delta: f64) -> Result<f64, ClockError> {
        Self::validate_delta(delta)?;
        let next = self.now + delta;
        if !next.is_finite() {
            return Err(ClockError::InvalidDelta { delta });
        }
        self.now = next;
        Ok(self.now)
    }

    /// Current virtual time in seconds.
    pub const fn now(&self) -> f64 {
        self.now
    }
}
