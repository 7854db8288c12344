//! Stroke resolution for simulated players.
//!
//! The scheduler never decides how many darts a player throws; it asks a
//! [`ScoreResolver`]. Resolvers are pure apart from the random source they
//! are handed, so the same seed always produces the same card.

use fairway_types::Difficulty;
use rand::{Rng, RngCore};

use crate::config::ScoringConfig;

/// Turns a skill level and a hole into a stroke count.
pub trait ScoreResolver: Send {
    /// Strokes taken by a player of `skill` (1 = best) on a hole of the given
    /// class and par. Implementations return a value in `1..=self.max_strokes(par)`.
    fn strokes(&self, skill: u8, difficulty: Difficulty, par: u8, rng: &mut dyn RngCore) -> u8;

    /// Highest stroke count this resolver produces (and the scheduler accepts
    /// from a human) on a hole of the given par.
    fn max_strokes(&self, par: u8) -> u8;
}

/// Default darts-golf model.
///
/// Strokes are a rounded normal draw centred on par plus a penalty for
/// weaker players. Skill 10 and better play to par on average; each level
/// above 10 adds a tenth of a stroke. Draws are clamped to
/// `1..=par + max_over_par`.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianResolver {
    sigma: f64,
    max_over_par: u8,
}

impl GaussianResolver {
    /// Create a resolver with the given spread and per-hole cap.
    pub const fn new(sigma: f64, max_over_par: u8) -> Self {
        Self {
            sigma,
            max_over_par,
        }
    }

    /// Create a resolver from the scoring section of the configuration.
    pub const fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.stroke_sigma, config.max_over_par)
    }

    /// Mean strokes for a skill level on a hole of the given par.
    pub fn mean(skill: u8, par: u8) -> f64 {
        let bias = (f64::from(skill) - 10.0) / 10.0;
        f64::from(par) + bias.max(0.0)
    }
}

impl Default for GaussianResolver {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl ScoreResolver for GaussianResolver {
    // Clamped to 1..=cap before the cast, so it cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn strokes(&self, skill: u8, _difficulty: Difficulty, par: u8, rng: &mut dyn RngCore) -> u8 {
        let draw = Self::mean(skill, par) + standard_normal(rng) * self.sigma;
        let cap = self.max_strokes(par).max(1);
        draw.round().clamp(1.0, f64::from(cap)) as u8
    }

    fn max_strokes(&self, par: u8) -> u8 {
        par.saturating_add(self.max_over_par)
    }
}

/// Draw from N(0, 1) with the Box-Muller transform.
fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    let u1: f64 = rng.random();
    let u2: f64 = rng.random();
    // Avoid ln(0).
    let u1 = if u1 > 0.0 { u1 } else { f64::MIN_POSITIVE };
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
