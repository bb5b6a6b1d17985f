//! Pipeline orchestration
//!
//! This module provides the public API for notebook processing. It wires the
//! stages together: notebook loader → action aggregator → report emitter.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::actions::{load_actions, ActionLog};
use crate::config::RunConfig;
use crate::error::Result;
use crate::notebook::{load_notebook, Notebook};
use crate::report::{write_intervals, write_report};

/// Species+sex counts for both sides of the cooperativeness flag
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CooperativenessCounts {
    pub cooperative: BTreeMap<String, usize>,
    pub uncooperative: BTreeMap<String, usize>,
}

/// Produce the time-on-state report with default settings (stateless, one-shot).
///
/// # Arguments
/// * `notebook_path` - Lab notebook CSV
/// * `actions_path` - Action log TSV
/// * `writer` - Destination of the tab-separated report
///
/// # Example
/// ```ignore
/// notebook_to_report(Path::new("notebook.csv"), Path::new("actions.tab"), io::stdout())?;
/// ```
pub fn notebook_to_report<W: Write>(
    notebook_path: &Path,
    actions_path: &Path,
    writer: W,
) -> Result<usize> {
    NotebookProcessor::default().report(notebook_path, actions_path, writer)
}

/// Runs the pipeline stages with one configuration
#[derive(Debug, Clone, Default)]
pub struct NotebookProcessor {
    config: RunConfig,
}

impl NotebookProcessor {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Load cooperative experiments and their intervals
    pub fn load(&self, notebook_path: &Path, actions_path: &Path) -> Result<(Notebook, ActionLog)> {
        // Stage 1: Notebook rows of cooperative subjects
        let notebook = load_notebook(notebook_path, &self.config.cooperative_sentinel)?;

        // Stage 2: Intervals restricted to those experiments
        let actions = load_actions(actions_path, Some(&notebook))?;

        log::info!(
            "{} experiments in notebook, {} with logged intervals",
            notebook.len(),
            actions.len()
        );
        Ok((notebook, actions))
    }

    /// Write the per-experiment report; returns the number of rows
    pub fn report<W: Write>(
        &self,
        notebook_path: &Path,
        actions_path: &Path,
        writer: W,
    ) -> Result<usize> {
        let (notebook, actions) = self.load(notebook_path, actions_path)?;

        // Stage 3: Bucket and emit
        write_report(
            writer,
            &notebook,
            &actions,
            &self.config.layout,
            &self.config.trim,
        )
    }

    /// Write the raw interval listing; returns the number of rows
    pub fn intervals<W: Write>(
        &self,
        notebook_path: &Path,
        actions_path: &Path,
        writer: W,
    ) -> Result<usize> {
        let (_, actions) = self.load(notebook_path, actions_path)?;
        write_intervals(writer, &actions)
    }

    /// Count subjects per species+sex on both sides of the flag
    pub fn cooperativeness_counts(&self, notebook_path: &Path) -> Result<CooperativenessCounts> {
        let cooperative = load_notebook(notebook_path, &self.config.cooperative_sentinel)?;
        let uncooperative = load_notebook(notebook_path, &self.config.uncooperative_sentinel)?;

        Ok(CooperativenessCounts {
            cooperative: cooperative.counts().clone(),
            uncooperative: uncooperative.counts().clone(),
        })
    }
}
