//! Notebook Actions - time-on-state reports for behavioral experiments
//!
//! Reads a lab notebook (CSV) and a timestamped action log (TSV), then
//! aggregates how long each experiment's subject spent in each state:
//! notebook loading → action aggregation → duration bucketing → report.
//!
//! ## Modules
//!
//! - **notebook**: experiment metadata filtered by the cooperativeness flag
//! - **actions**: per-experiment intervals between consecutive actions
//! - **durations**: interval sequences folded into `wall` / fruit totals
//! - **report**: tab-separated report and interval listing

pub mod actions;
pub mod config;
pub mod durations;
pub mod error;
pub mod notebook;
pub mod pipeline;
pub mod report;
pub mod types;

pub use actions::{parse_actions, parse_timestamp, ActionLog, ExperimentFilter};
pub use config::{load_config, RunConfig};
pub use durations::{bucket_intervals, TrimPolicy};
pub use error::{NotebookError, Result};
pub use notebook::{parse_notebook, Notebook};
pub use pipeline::{notebook_to_report, CooperativenessCounts, NotebookProcessor};
pub use report::{write_intervals, write_report, ReportLayout};
pub use types::{ActionEvent, ActionInterval, ExperimentId, ExperimentRecord, StateDurations};

/// Crate version, reported by the CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
