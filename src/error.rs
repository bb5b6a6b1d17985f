//! Error types for notebook and action-log processing

use thiserror::Error;

/// Errors that can occur while loading, aggregating or reporting.
///
/// Every variant is fatal: the tool runs over operator-curated files and
/// nothing is retried.
#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed action row {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    #[error("Invalid timestamp {value:?}: {source}")]
    TimestampError {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Experiment not found in notebook: {0}")]
    UnknownExperiment(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, NotebookError>;
