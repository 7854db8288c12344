//! Configuration loading and typed config structures for the Fairway
//! simulation.
//!
//! The canonical configuration lives in `fairway-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader that reads the file, and a validator that rejects
//! values the scheduler cannot run with.
//!
//! The tuning constants of the scheduler (per-tick completion batch limit,
//! difficulty time factors, pace, tee interval) all live here rather than in
//! code so they can be changed per tournament.

use std::path::Path;

use fairway_types::Difficulty;
use serde::{Deserialize, Serialize};

/// Smallest supported pairing size.
pub const MIN_PAIRING_SIZE: usize = 2;

/// Largest supported pairing size.
pub const MAX_PAIRING_SIZE: usize = 4;

/// Highest (worst) skill level.
pub const MAX_SKILL: u8 = 20;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds values the scheduler rejects.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

impl From<ParamsError> for ConfigError {
    fn from(err: ParamsError) -> Self {
        Self::Invalid { reason: err.reason }
    }
}

/// A scheduler parameter the scheduler cannot run with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct ParamsError {
    /// Explanation naming the offending field.
    pub reason: String,
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `fairway-config.yaml`. All fields have defaults
/// matching a single-course darts-golf tournament.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed).
    #[serde(default)]
    pub world: WorldConfig,

    /// The interactive participant and how their turns are played.
    #[serde(default)]
    pub session: SessionConfig,

    /// Station pacing and tick batching.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Course layout.
    #[serde(default)]
    pub course: CourseConfig,

    /// Round count and elimination cut.
    #[serde(default)]
    pub tournament: TournamentConfig,

    /// Default score model parameters.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Roster source and fallback generation.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Real-time driver settings for the binary.
    #[serde(default)]
    pub driver: DriverConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to a mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the scheduler depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SKILL).contains(&self.session.human_skill) {
            return Err(invalid(format!(
                "session.human_skill must be between 1 and {MAX_SKILL}"
            )));
        }
        if self.session.human_name.trim().is_empty() {
            return Err(invalid("session.human_name must not be empty".to_owned()));
        }
        if !is_positive(self.scoring.stroke_sigma) {
            return Err(invalid("scoring.stroke_sigma must be positive".to_owned()));
        }
        let roster = &self.roster;
        if roster.fallback_min_extra > roster.fallback_max_extra {
            return Err(invalid(
                "roster.fallback_min_extra must not exceed roster.fallback_max_extra".to_owned(),
            ));
        }
        if roster.fallback_min_skill == 0
            || roster.fallback_min_skill > roster.fallback_max_skill
            || roster.fallback_max_skill > MAX_SKILL
        {
            return Err(invalid(format!(
                "roster fallback skills must satisfy 1 <= min <= max <= {MAX_SKILL}"
            )));
        }
        if !is_positive(self.driver.speed) {
            return Err(invalid("driver.speed must be positive".to_owned()));
        }
        if !is_positive(self.driver.fast_forward_step_secs) {
            return Err(invalid(
                "driver.fast_forward_step_secs must be positive".to_owned(),
            ));
        }
        self.scheduler_params().validate()?;
        Ok(())
    }

    /// The subset of configuration the scheduler carries at runtime and
    /// persists in save files.
    pub fn scheduler_params(&self) -> SchedulerParams {
        SchedulerParams {
            pairing_size: self.session.pairing_size,
            pace_base_secs: self.schedule.pace_base_secs,
            tee_interval_secs: self.schedule.tee_interval_secs,
            completion_batch_limit: self.schedule.completion_batch_limit,
            time_factors: self.schedule.time_factors,
            course: self.course.holes.clone(),
            rounds: self.tournament.rounds,
            cut_after_round: self.tournament.cut_after_round,
            cut_size: self.tournament.cut_size,
            session_board_size: self.tournament.session_board_size,
        }
    }
}

const fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

fn params_error(reason: impl Into<String>) -> ParamsError {
    ParamsError {
        reason: reason.into(),
    }
}

const fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable tournament name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// The interactive participant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Name of the human-controlled player.
    #[serde(default = "default_human_name")]
    pub human_name: String,

    /// Skill level of the human player (1 = best).
    #[serde(default = "default_human_skill")]
    pub human_skill: u8,

    /// When true, the human's pairing waits for a submitted score at the end
    /// of every hole. When false, the human's shots are auto-played.
    #[serde(default)]
    pub manual_mode: bool,

    /// Players per pairing (2..=4).
    #[serde(default = "default_pairing_size")]
    pub pairing_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            human_name: default_human_name(),
            human_skill: default_human_skill(),
            manual_mode: false,
            pairing_size: default_pairing_size(),
        }
    }
}

/// Station pacing and per-tick batching.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduleConfig {
    /// Baseline virtual seconds a pairing spends on a hole.
    #[serde(default = "default_pace_base_secs")]
    pub pace_base_secs: f64,

    /// Virtual seconds between consecutive tee times.
    #[serde(default = "default_tee_interval_secs")]
    pub tee_interval_secs: f64,

    /// Maximum station completions processed in one tick.
    #[serde(default = "default_completion_batch_limit")]
    pub completion_batch_limit: usize,

    /// Pace multipliers per difficulty class.
    #[serde(default)]
    pub time_factors: TimeFactors,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            pace_base_secs: default_pace_base_secs(),
            tee_interval_secs: default_tee_interval_secs(),
            completion_batch_limit: default_completion_batch_limit(),
            time_factors: TimeFactors::default(),
        }
    }
}

/// Pace multipliers per difficulty class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeFactors {
    /// Multiplier for par-3 holes.
    #[serde(default = "default_short_factor")]
    pub short: f64,
    /// Multiplier for par-4 holes.
    #[serde(default = "default_medium_factor")]
    pub medium: f64,
    /// Multiplier for par-5 holes.
    #[serde(default = "default_long_factor")]
    pub long: f64,
}

impl TimeFactors {
    /// Multiplier for the given class.
    pub const fn factor(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Short => self.short,
            Difficulty::Medium => self.medium,
            Difficulty::Long => self.long,
        }
    }
}

impl Default for TimeFactors {
    fn default() -> Self {
        Self {
            short: default_short_factor(),
            medium: default_medium_factor(),
            long: default_long_factor(),
        }
    }
}

/// Course layout: one difficulty class per hole. The number of holes is the
/// station count N. Each round plays a random permutation of this layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourseConfig {
    /// Difficulty class of each hole.
    #[serde(default = "default_course_holes")]
    pub holes: Vec<Difficulty>,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            holes: default_course_holes(),
        }
    }
}

/// Round count and elimination cut.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TournamentConfig {
    /// Number of rounds in the tournament.
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// Round after which the cut is applied.
    #[serde(default = "default_cut_after_round")]
    pub cut_after_round: u32,

    /// Number of players kept by the cut.
    #[serde(default = "default_cut_size")]
    pub cut_size: usize,

    /// Number of finishers kept on the session board.
    #[serde(default = "default_session_board_size")]
    pub session_board_size: usize,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            cut_after_round: default_cut_after_round(),
            cut_size: default_cut_size(),
            session_board_size: default_session_board_size(),
        }
    }
}

/// Default score model parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoringConfig {
    /// Standard deviation of the stroke distribution.
    #[serde(default = "default_stroke_sigma")]
    pub stroke_sigma: f64,

    /// Maximum strokes over par on a single hole.
    #[serde(default = "default_max_over_par")]
    pub max_over_par: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            stroke_sigma: default_stroke_sigma(),
            max_over_par: default_max_over_par(),
        }
    }
}

/// Roster source and fallback generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// Optional roster file (`name,skill` per line).
    #[serde(default)]
    pub path: Option<String>,

    /// Fewest generated opponents when falling back to built-in names.
    #[serde(default = "default_fallback_min_extra")]
    pub fallback_min_extra: usize,

    /// Most generated opponents when falling back to built-in names.
    #[serde(default = "default_fallback_max_extra")]
    pub fallback_max_extra: usize,

    /// Lowest generated skill level.
    #[serde(default = "default_fallback_min_skill")]
    pub fallback_min_skill: u8,

    /// Highest generated skill level.
    #[serde(default = "default_fallback_max_skill")]
    pub fallback_max_skill: u8,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: None,
            fallback_min_extra: default_fallback_min_extra(),
            fallback_max_extra: default_fallback_max_extra(),
            fallback_min_skill: default_fallback_min_skill(),
            fallback_max_skill: default_fallback_max_skill(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`RUST_LOG` takes precedence).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Real-time driver settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriverConfig {
    /// Wall-clock milliseconds between driver ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Virtual seconds simulated per wall-clock second.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Virtual seconds per step when fast-forwarding.
    #[serde(default = "default_fast_forward_step_secs")]
    pub fast_forward_step_secs: f64,

    /// Upper bound on steps for one fast-forward run.
    #[serde(default = "default_max_steps")]
    pub max_steps: u64,

    /// Hold the clock while the human's score is outstanding.
    #[serde(default = "default_pause_on_turn")]
    pub pause_on_turn: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            speed: default_speed(),
            fast_forward_step_secs: default_fast_forward_step_secs(),
            max_steps: default_max_steps(),
            pause_on_turn: default_pause_on_turn(),
        }
    }
}

/// Scheduler parameters carried by a running simulation.
///
/// Built from [`SimulationConfig::scheduler_params`] and persisted in save
/// files so a reloaded game keeps the pacing it started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerParams {
    /// Players per pairing.
    pub pairing_size: usize,
    /// Baseline virtual seconds per hole.
    pub pace_base_secs: f64,
    /// Virtual seconds between tee times.
    pub tee_interval_secs: f64,
    /// Maximum completions per tick.
    pub completion_batch_limit: usize,
    /// Pace multipliers per difficulty class.
    pub time_factors: TimeFactors,
    /// Course layout (one class per hole).
    pub course: Vec<Difficulty>,
    /// Number of rounds.
    pub rounds: u32,
    /// Round after which the cut applies.
    pub cut_after_round: u32,
    /// Players kept by the cut.
    pub cut_size: usize,
    /// Finishers kept on the session board.
    pub session_board_size: usize,
}

impl SchedulerParams {
    /// Number of stations (holes per round).
    pub fn station_count(&self) -> usize {
        self.course.len()
    }

    /// Check every value the tick engine and round manager depend on.
    ///
    /// Field names in the messages use their configuration paths.
    ///
    /// # Errors
    ///
    /// Returns a [`ParamsError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let size = self.pairing_size;
        if !(MIN_PAIRING_SIZE..=MAX_PAIRING_SIZE).contains(&size) {
            return Err(params_error(format!(
                "session.pairing_size must be between {MIN_PAIRING_SIZE} and {MAX_PAIRING_SIZE}, got {size}"
            )));
        }
        if !is_positive(self.pace_base_secs) {
            return Err(params_error("schedule.pace_base_secs must be positive"));
        }
        if !self.tee_interval_secs.is_finite() || self.tee_interval_secs < 0.0 {
            return Err(params_error(
                "schedule.tee_interval_secs must be finite and non-negative",
            ));
        }
        if self.completion_batch_limit == 0 {
            return Err(params_error(
                "schedule.completion_batch_limit must be at least 1",
            ));
        }
        for class in Difficulty::ALL {
            if !is_positive(self.time_factors.factor(class)) {
                return Err(params_error(format!(
                    "schedule.time_factors.{class} must be positive"
                )));
            }
        }
        if self.course.is_empty() {
            return Err(params_error("course.holes must list at least one hole"));
        }
        if u8::try_from(self.course.len()).is_err() {
            return Err(params_error("course.holes must list at most 255 holes"));
        }
        if self.rounds == 0 {
            return Err(params_error("tournament.rounds must be at least 1"));
        }
        if self.cut_size == 0 {
            return Err(params_error("tournament.cut_size must be at least 1"));
        }
        Ok(())
    }

    /// Countdown for a station of the given class.
    pub const fn station_duration(&self, difficulty: Difficulty) -> f64 {
        self.pace_base_secs * self.time_factors.factor(difficulty)
    }
}

impl Default for SchedulerParams {
    fn default() -> Self {
        SimulationConfig::default().scheduler_params()
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Golf Darts Open".to_owned()
}

const fn default_seed() -> u64 {
    42
}

fn default_human_name() -> String {
    "You".to_owned()
}

const fn default_human_skill() -> u8 {
    12
}

const fn default_pairing_size() -> usize {
    3
}

const fn default_pace_base_secs() -> f64 {
    3.0
}

const fn default_tee_interval_secs() -> f64 {
    5.0
}

const fn default_completion_batch_limit() -> usize {
    24
}

const fn default_short_factor() -> f64 {
    1.0
}

const fn default_medium_factor() -> f64 {
    1.3
}

const fn default_long_factor() -> f64 {
    1.6
}

/// Mostly par 3s with a few par 4s and one par 5.
fn default_course_holes() -> Vec<Difficulty> {
    [3_u8, 3, 3, 4, 3, 3, 4, 3, 4, 3, 3, 3, 4, 3, 3, 4, 3, 5]
        .into_iter()
        .filter_map(Difficulty::from_par)
        .collect()
}

const fn default_rounds() -> u32 {
    4
}

const fn default_cut_after_round() -> u32 {
    2
}

const fn default_cut_size() -> usize {
    50
}

const fn default_session_board_size() -> usize {
    10
}

const fn default_stroke_sigma() -> f64 {
    0.8
}

const fn default_max_over_par() -> u8 {
    5
}

const fn default_fallback_min_extra() -> usize {
    8
}

const fn default_fallback_max_extra() -> usize {
    20
}

const fn default_fallback_min_skill() -> u8 {
    8
}

const fn default_fallback_max_skill() -> u8 {
    16
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    250
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_fast_forward_step_secs() -> f64 {
    1.0
}

const fn default_max_steps() -> u64 {
    1_000_000
}

const fn default_pause_on_turn() -> bool {
    true
}
