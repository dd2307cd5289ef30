//! Error types for the data, statistics and configuration layers.
//!
//! Stage orchestration (`pipeline`, the binary) wraps these in `anyhow`
//! with file-path context; library code returns them directly.

use std::path::PathBuf;

use thiserror::Error;

/// Problems reading, parsing or writing the observation table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("missing expected column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}, column '{column}': '{value}' is not a valid {expected}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("observation {id}: {got} presence indicators for {expected} species")]
    PresenceArity { id: u64, expected: usize, got: usize },

    #[error("observation {id}: presence indicator {value} is not 0 or 1")]
    NonBinaryPresence { id: u64, value: u8 },

    #[error("dataset contains no observations")]
    Empty,
}

/// Failures of the statistical analysis.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("cannot analyze an empty dataset")]
    EmptyDataset,

    #[error("dataset declares no species")]
    NoSpecies,

    #[error("habitat '{habitat}' has no observations")]
    EmptyHabitat { habitat: String },

    #[error("contingency table is degenerate: {0}")]
    DegenerateTable(String),

    #[error("independence test for species {species} failed: {source}")]
    IndependenceTest {
        species: String,
        #[source]
        source: Box<StatsError>,
    },

    #[error("chi-square distribution: {0}")]
    Distribution(String),
}

/// Unreadable or invalid survey configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
