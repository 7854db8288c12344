//! Pairing construction.
//!
//! The roster is shuffled and cut into contiguous groups of the configured
//! size. Only the final group may be smaller. Pairing ids follow build order,
//! which is also the tee order and the final FIFO tie-breaker.

use fairway_types::{Pairing, PairingId, PlayerId};
use rand::RngCore;
use rand::seq::SliceRandom;

use crate::config::{MAX_PAIRING_SIZE, MIN_PAIRING_SIZE, ParamsError};

/// Errors that can occur when building pairings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The group size is outside the supported range.
    #[error("pairing size {size} outside {MIN_PAIRING_SIZE}..={MAX_PAIRING_SIZE}")]
    InvalidGroupSize {
        /// The rejected size.
        size: usize,
    },

    /// There is nobody to pair.
    #[error("cannot build pairings from an empty roster")]
    EmptyRoster,

    /// More pairings than identifiers.
    #[error("too many pairings for the id space")]
    TooManyPairings,

    /// The scheduler parameters cannot be run with.
    #[error("invalid scheduler parameters: {source}")]
    InvalidParams {
        /// The offending parameter.
        #[from]
        source: ParamsError,
    },
}

/// Shuffle `roster` and split it into groups of `group_size`.
///
/// # Errors
///
/// Returns [`BuildError::EmptyRoster`] for an empty roster and
/// [`BuildError::InvalidGroupSize`] when `group_size` is outside `2..=4`.
pub fn build_pairings(
    roster: &[PlayerId],
    group_size: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<Pairing>, BuildError> {
    if !(MIN_PAIRING_SIZE..=MAX_PAIRING_SIZE).contains(&group_size) {
        return Err(BuildError::InvalidGroupSize { size: group_size });
    }
    if roster.is_empty() {
        return Err(BuildError::EmptyRoster);
    }

    let mut order = roster.to_vec();
    order.shuffle(rng);

    order
        .chunks(group_size)
        .enumerate()
        .map(|(idx, chunk)| {
            let id = u32::try_from(idx).map_err(|_err| BuildError::TooManyPairings)?;
            Ok(Pairing {
                id: PairingId::new(id),
                players: chunk.to_vec(),
            })
        })
        .collect()
}
