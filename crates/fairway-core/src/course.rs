//! Course layout and per-round difficulty sequencing.
//!
//! The configured layout fixes how many holes of each difficulty class the
//! course has. Every round plays a fresh random permutation of that layout,
//! and every station assignment draws a new dartboard target.

use fairway_types::{Difficulty, StationMeta};
use rand::Rng;
use rand::RngCore;
use rand::seq::SliceRandom;

/// Lowest dartboard segment.
pub const MIN_TARGET: u8 = 1;

/// Highest dartboard segment.
pub const MAX_TARGET: u8 = 20;

/// Draw the difficulty sequence for one round: a permutation of `layout`.
pub fn difficulty_sequence(layout: &[Difficulty], rng: &mut dyn RngCore) -> Vec<Difficulty> {
    let mut sequence = layout.to_vec();
    sequence.shuffle(rng);
    sequence
}

/// Build the metadata for an attempt at `hole` of the given class.
pub fn station_meta(hole: u8, difficulty: Difficulty, rng: &mut dyn RngCore) -> StationMeta {
    StationMeta {
        hole,
        difficulty,
        par: difficulty.par(),
        target: rng.random_range(MIN_TARGET..=MAX_TARGET),
    }
}

/// Total par of a sequence.
pub fn course_par(sequence: &[Difficulty]) -> u32 {
    sequence
        .iter()
        .fold(0_u32, |acc, d| acc.saturating_add(u32::from(d.par())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    fn layout() -> Vec<Difficulty> {
        vec![
            Difficulty::Short,
            Difficulty::Short,
            Difficulty::Medium,
            Difficulty::Long,
        ]
    }

    #[test]
    fn sequence_is_a_permutation_of_the_layout() {
        let mut rng = SimRng::from_seed(5);
        let mut sequence = difficulty_sequence(&layout(), &mut rng);
        sequence.sort();
        let mut expected = layout();
        expected.sort();
        assert_eq!(sequence, expected);
    }

    #[test]
    fn sequence_is_deterministic_per_seed() {
        let layout: Vec<Difficulty> = (0..18)
            .map(|i| Difficulty::ALL.get(i % 3).copied().unwrap_or(Difficulty::Short))
            .collect();
        let a = difficulty_sequence(&layout, &mut SimRng::from_seed(11));
        let b = difficulty_sequence(&layout, &mut SimRng::from_seed(11));
        assert_eq!(a, b);
    }

    #[test]
    fn station_meta_uses_class_par_and_board_target() {
        let mut rng = SimRng::from_seed(1);
        for _ in 0..50 {
            let meta = station_meta(4, Difficulty::Long, &mut rng);
            assert_eq!(meta.hole, 4);
            assert_eq!(meta.par, 5);
            assert!((MIN_TARGET..=MAX_TARGET).contains(&meta.target));
        }
    }

    #[test]
    fn course_par_sums_holes() {
        assert_eq!(course_par(&layout()), 15);
    }
}
