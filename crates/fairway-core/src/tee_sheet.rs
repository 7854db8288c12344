//! Tee sheet: staggered release of pairings onto the course.
//!
//! Pairing `i` tees off at `round_start + i * interval`. A release pass moves
//! every pre-release pairing whose tee time has arrived into the queue and
//! stamps it with the current clock as its queue-entry time.

use fairway_types::{PairingId, PairingState, PairingStatus};
use tracing::debug;

/// Tee time of the pairing at build position `index`.
#[allow(clippy::cast_precision_loss)]
pub const fn tee_time(round_start: f64, interval: f64, index: usize) -> f64 {
    round_start + interval * index as f64
}

/// Fresh pre-release states for `count` pairings.
pub fn initial_states(count: usize, round_start: f64, interval: f64) -> Vec<PairingState> {
    (0..count)
        .map(|idx| PairingState::pre_release(tee_time(round_start, interval, idx)))
        .collect()
}

/// Release every pairing whose tee time is at or before `now`.
///
/// Returns the released pairings in build order.
pub fn release_due(states: &mut [PairingState], now: f64) -> Vec<PairingId> {
    let mut released = Vec::new();
    for (idx, state) in states.iter_mut().enumerate() {
        if state.status != PairingStatus::PreRelease || state.tee_time > now {
            continue;
        }
        state.status = PairingStatus::Queued;
        state.queue_entry = Some(now);
        let id = PairingId::new(u32::try_from(idx).unwrap_or(u32::MAX));
        debug!(pairing = %id, tee_time = state.tee_time, now, "Pairing released");
        released.push(id);
    }
    released
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tee_times_are_staggered_by_interval() {
        let states = initial_states(3, 0.0, 5.0);
        let times: Vec<f64> = states.iter().map(|s| s.tee_time).collect();
        assert!((times.first().copied().unwrap_or(-1.0) - 0.0).abs() < 1e-9);
        assert!((times.get(1).copied().unwrap_or(-1.0) - 5.0).abs() < 1e-9);
        assert!((times.get(2).copied().unwrap_or(-1.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn tee_times_offset_by_round_start() {
        assert!((tee_time(100.0, 5.0, 2) - 110.0).abs() < 1e-9);
    }

    #[test]
    fn release_at_time_zero_only_frees_first_pairing() {
        let mut states = initial_states(3, 0.0, 5.0);
        let released = release_due(&mut states, 0.0);
        assert_eq!(released, vec![PairingId::new(0)]);
        let statuses: Vec<PairingStatus> = states.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                PairingStatus::Queued,
                PairingStatus::PreRelease,
                PairingStatus::PreRelease
            ]
        );
    }

    #[test]
    fn release_stamps_queue_entry_with_current_time() {
        let mut states = initial_states(2, 0.0, 5.0);
        let _ = release_due(&mut states, 0.0);
        let released = release_due(&mut states, 7.5);
        assert_eq!(released, vec![PairingId::new(1)]);
        let entry = states.get(1).and_then(|s| s.queue_entry);
        assert!(entry.is_some_and(|t| (t - 7.5).abs() < 1e-9));
    }

    #[test]
    fn released_pairings_are_not_released_twice() {
        let mut states = initial_states(2, 0.0, 5.0);
        let _ = release_due(&mut states, 10.0);
        assert!(release_due(&mut states, 20.0).is_empty());
    }
}
