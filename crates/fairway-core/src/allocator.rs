//! Station allocation.
//!
//! Every free station takes the longest-waiting queued pairing whose next
//! hole is that station. Waiting time is the queue-entry stamp; ties go to
//! the lower pairing id, which is tee order. Pairings play holes strictly in
//! order, so a pairing is only ever eligible for one station.

use std::cmp::Ordering;

use fairway_types::{PairingId, PairingState, PairingStatus, StationMeta};
use rand::RngCore;
use tracing::debug;

use crate::config::SchedulerParams;
use crate::course::station_meta;
use crate::round::RoundState;

/// One pairing placed on a station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    /// The placed pairing.
    pub pairing: PairingId,
    /// The station it now occupies.
    pub station: u8,
    /// Metadata generated for this attempt.
    pub meta: StationMeta,
    /// Initial countdown in virtual seconds.
    pub timer: f64,
}

/// FIFO order: earliest queue entry first, then lowest pairing id.
fn fifo_order(a: (usize, &PairingState), b: (usize, &PairingState)) -> Ordering {
    let entry_a = a.1.queue_entry.unwrap_or(f64::INFINITY);
    let entry_b = b.1.queue_entry.unwrap_or(f64::INFINITY);
    entry_a.total_cmp(&entry_b).then_with(|| a.0.cmp(&b.0))
}

/// Fill every free station from the queue. Returns the placements in
/// station order.
pub fn allocate(
    round: &mut RoundState,
    params: &SchedulerParams,
    rng: &mut dyn RngCore,
) -> Vec<Allocation> {
    let mut placed = Vec::new();

    for station in 0..round.slots.len() {
        if round.slots.get(station).is_some_and(Option::is_some) {
            continue;
        }
        let Ok(hole) = u8::try_from(station) else {
            break;
        };
        let Some(&difficulty) = round.difficulties.get(station) else {
            continue;
        };

        let candidate = round
            .states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status == PairingStatus::Queued && s.next_station == hole)
            .min_by(|a, b| fifo_order(*a, *b))
            .map(|(idx, _)| idx);
        let Some(idx) = candidate else {
            continue;
        };

        let meta = station_meta(hole, difficulty, rng);
        let timer = params.station_duration(difficulty);
        let pairing = PairingId::new(u32::try_from(idx).unwrap_or(u32::MAX));

        if let Some(state) = round.state_mut(pairing) {
            state.status = PairingStatus::Active;
            state.queue_entry = None;
            state.current = Some(meta);
            state.timer = Some(timer);
        }
        if let Some(slot) = round.slots.get_mut(station) {
            *slot = Some(pairing);
        }

        debug!(
            pairing = %pairing,
            station = hole,
            difficulty = %difficulty,
            target = meta.target,
            timer,
            "Pairing allocated"
        );
        placed.push(Allocation {
            pairing,
            station: hole,
            meta,
            timer,
        });
    }

    placed
}
