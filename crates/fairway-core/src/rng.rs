//! Seedable, resumable random source.
//!
//! Every random draw in the scheduler (pairing shuffles, difficulty
//! sequences, station targets, and score resolution) goes through one
//! [`SimRng`]. It is a `ChaCha8` stream keyed by a `u64` seed, so its position
//! can be exported as `(seed, word position)` and restored exactly, which is
//! what makes a reloaded game continue tick-for-tick like the original.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Exported position of a [`SimRng`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    /// Seed the stream was created from.
    pub seed: u64,
    /// Number of 32-bit words consumed from the stream.
    pub word_pos: u64,
}

/// Deterministic random source used by the whole simulation.
#[derive(Debug, Clone)]
pub struct SimRng {
    seed: u64,
    inner: ChaCha8Rng,
}

impl SimRng {
    /// Create a stream from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Rebuild a stream at an exported position.
    pub fn restore(state: RngState) -> Self {
        let mut rng = Self::from_seed(state.seed);
        rng.inner.set_word_pos(u128::from(state.word_pos));
        rng
    }

    /// Export the current position.
    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            word_pos: u64::try_from(self.inner.get_word_pos()).unwrap_or(u64::MAX),
        }
    }

    /// Seed the stream was created from.
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.inner.fill_bytes(dst);
    }
}
