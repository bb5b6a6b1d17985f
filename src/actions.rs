//! Action log aggregation
//!
//! Converts the chronologically ordered action log (tab-separated
//! `experiment_id, state_label, timestamp`, no header) into per-experiment
//! interval sequences. Each interval is the time spent in a state before the
//! next logged action of the same experiment.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{NotebookError, Result};
use crate::notebook::Notebook;
use crate::types::{ActionEvent, ActionInterval, ExperimentId};

/// Timestamp layout after the fractional seconds are cut off
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Set of experiments the aggregator is allowed to read
pub trait ExperimentFilter {
    fn includes(&self, id: &ExperimentId) -> bool;
}

impl ExperimentFilter for Notebook {
    fn includes(&self, id: &ExperimentId) -> bool {
        self.contains(id)
    }
}

impl ExperimentFilter for HashSet<ExperimentId> {
    fn includes(&self, id: &ExperimentId) -> bool {
        self.contains(id)
    }
}

/// Interval sequences keyed by experiment, in first-encountered order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionLog {
    experiments: Vec<(ExperimentId, Vec<ActionInterval>)>,
    index: HashMap<ExperimentId, usize>,
}

impl ActionLog {
    fn push(&mut self, id: &ExperimentId, interval: ActionInterval) {
        let slot = match self.index.get(id) {
            Some(&slot) => slot,
            None => {
                self.index.insert(id.clone(), self.experiments.len());
                self.experiments.push((id.clone(), Vec::new()));
                self.experiments.len() - 1
            }
        };
        self.experiments[slot].1.push(interval);
    }

    pub fn get(&self, id: &ExperimentId) -> Option<&[ActionInterval]> {
        self.index
            .get(id)
            .map(|&slot| self.experiments[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExperimentId, &[ActionInterval])> {
        self.experiments
            .iter()
            .map(|(id, intervals)| (id, intervals.as_slice()))
    }

    /// Number of experiments with at least one interval
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    pub fn interval_count(&self) -> usize {
        self.experiments.iter().map(|(_, intervals)| intervals.len()).sum()
    }
}

/// Parse a log timestamp, ignoring anything after the first `.`
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let whole_seconds = raw.trim().split('.').next().unwrap_or_default();
    NaiveDateTime::parse_from_str(whole_seconds, TIMESTAMP_FORMAT).map_err(|source| {
        NotebookError::TimestampError {
            value: raw.to_string(),
            source,
        }
    })
}

/// Aggregate an action log read from `reader`.
///
/// When `restrict` is given, rows of other experiments are skipped before
/// they reach the previous-row tracking, so they neither end nor extend a
/// run of the experiments that are kept.
pub fn parse_actions<R, F>(reader: R, restrict: Option<&F>) -> Result<ActionLog>
where
    R: Read,
    F: ExperimentFilter + ?Sized,
{
    let mut tsv = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let mut actions = ActionLog::default();
    let mut previous: Option<ActionEvent> = None;
    let mut skipped = 0usize;

    for row in tsv.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        if row.len() < 3 {
            return Err(NotebookError::MalformedRow {
                line,
                reason: format!("expected 3 tab-separated columns, found {}", row.len()),
            });
        }

        let experiment_id = ExperimentId::new(&row[0]);
        if let Some(filter) = restrict {
            if !filter.includes(&experiment_id) {
                skipped += 1;
                continue;
            }
        }

        let event = ActionEvent {
            experiment_id,
            label: row[1].to_string(),
            timestamp: parse_timestamp(&row[2])?,
        };

        if let Some(prev) = previous.as_ref() {
            if prev.experiment_id == event.experiment_id {
                let duration_sec = (event.timestamp - prev.timestamp).num_seconds();
                if duration_sec < 0 {
                    log::warn!(
                        "experiment {}: action on line {} is {}s earlier than the previous one",
                        event.experiment_id,
                        line,
                        -duration_sec
                    );
                }
                actions.push(
                    &prev.experiment_id,
                    ActionInterval::new(prev.label.clone(), duration_sec),
                );
            }
        }

        previous = Some(event);
    }

    log::debug!(
        "actions: {} intervals across {} experiments ({} rows skipped)",
        actions.interval_count(),
        actions.len(),
        skipped
    );

    Ok(actions)
}

/// Open and aggregate an action log file
pub fn load_actions<F>(path: &Path, restrict: Option<&F>) -> Result<ActionLog>
where
    F: ExperimentFilter + ?Sized,
{
    log::info!("Loading action log {:?}", path);
    let file = File::open(path)?;
    parse_actions(file, restrict)
}
