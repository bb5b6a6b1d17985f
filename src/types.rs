//! Core data types
//!
//! Experiments come from the lab notebook, action events from the timestamped
//! action log. Intervals and state durations are derived from the events.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{NotebookError, Result};

/// Identifier of one recorded behavioral trial.
///
/// Notebook and action log ids are matched as trimmed strings, so `"7"` in
/// the CSV and `"7"` in the TSV always refer to the same experiment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentId(String);

impl ExperimentId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExperimentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExperimentId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One notebook row: the experiment id plus every column of the row, in
/// header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub id: ExperimentId,
    pub fields: Vec<(String, String)>,
}

impl ExperimentRecord {
    /// Look up a column value; an absent column is an error
    pub fn field(&self, name: &str) -> Result<&str> {
        self.fields
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| NotebookError::MissingColumn(name.to_string()))
    }

    /// Look up a column value, falling back to `default` when absent
    pub fn field_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.field(name).unwrap_or(default)
    }
}

/// A single row of the action log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub experiment_id: ExperimentId,
    pub label: String,
    pub timestamp: NaiveDateTime,
}

/// Time spent in `label` before the next logged action of the same experiment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInterval {
    pub label: String,
    pub duration_sec: i64,
}

impl ActionInterval {
    pub fn new(label: impl Into<String>, duration_sec: i64) -> Self {
        Self {
            label: label.into(),
            duration_sec,
        }
    }
}

/// Accumulated seconds per canonical state for one experiment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDurations(BTreeMap<String, i64>);

impl StateDurations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `seconds` to `state`, creating the bucket on first use
    pub fn add(&mut self, state: &str, seconds: i64) {
        *self.0.entry(state.to_string()).or_insert(0) += seconds;
    }

    /// Seconds accumulated for `state`; unvisited states are zero
    pub fn get(&self, state: &str) -> i64 {
        self.0.get(state).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(state, seconds)| (state.as_str(), *seconds))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
