//! Error types for the `fairway` binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the driver loop
//! so `main` can propagate with `?`.

/// Top-level error for the `fairway` binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: fairway_core::config::ConfigError,
    },

    /// The roster file could not be loaded.
    #[error("roster error: {source}")]
    Roster {
        /// The underlying roster error.
        #[from]
        source: fairway_core::roster::RosterError,
    },

    /// The first round could not be built.
    #[error("pairing error: {source}")]
    Build {
        /// The underlying build error.
        #[from]
        source: fairway_core::pairing::BuildError,
    },

    /// A tick failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: fairway_core::tick::TickError,
    },

    /// A fast-forward run failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: fairway_core::runner::RunnerError,
    },

    /// A save file could not be written or loaded.
    #[error("save file error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: fairway_core::snapshot::SnapshotError,
    },

    /// Reading stdin or a file failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
