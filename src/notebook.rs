//! Lab notebook loader
//!
//! Reads the comma-delimited notebook, keeps the rows whose cooperativeness
//! flag matches a sentinel, and indexes them by experiment id.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{NotebookError, Result};
use crate::types::{ExperimentId, ExperimentRecord};

pub const ID_COLUMN: &str = "Id";
pub const SPECIES_COLUMN: &str = "Species";
pub const SEX_COLUMN: &str = "Sex";
pub const UNCOOPERATIVE_COLUMN: &str = "Uncooperative";

/// Sentinel selecting cooperative subjects
pub const DEFAULT_SENTINEL: &str = "N";

/// Experiments selected from a notebook, in file order
#[derive(Debug, Clone, Default)]
pub struct Notebook {
    records: Vec<ExperimentRecord>,
    index: HashMap<ExperimentId, usize>,
    counts: BTreeMap<String, usize>,
}

impl Notebook {
    fn insert(&mut self, record: ExperimentRecord) {
        match self.index.get(&record.id) {
            // Same id seen twice: the later row wins, keeping its first position
            Some(&slot) => self.records[slot] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn contains(&self, id: &ExperimentId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &ExperimentId) -> Option<&ExperimentRecord> {
        self.index.get(id).map(|&slot| &self.records[slot])
    }

    /// Look up an experiment that must exist
    pub fn require(&self, id: &ExperimentId) -> Result<&ExperimentRecord> {
        self.get(id)
            .ok_or_else(|| NotebookError::UnknownExperiment(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &ExperimentId> {
        self.records.iter().map(|record| &record.id)
    }

    /// Number of included rows per species+sex key (e.g. `"melanogasterF"`).
    ///
    /// Every included row is counted, duplicates of an id included.
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse a notebook from any reader, keeping rows whose `Uncooperative`
/// column equals `sentinel`.
pub fn parse_notebook<R: Read>(reader: R, sentinel: &str) -> Result<Notebook> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| NotebookError::MissingColumn(name.to_string()))
    };
    let [id_at, species_at, sex_at, flag_at] = [
        position(ID_COLUMN)?,
        position(SPECIES_COLUMN)?,
        position(SEX_COLUMN)?,
        position(UNCOOPERATIVE_COLUMN)?,
    ];

    let mut notebook = Notebook::default();
    let mut seen = 0usize;

    for row in csv_reader.records() {
        let row = row?;
        seen += 1;

        let cell = |at: usize| row.get(at).unwrap_or_default();

        if cell(flag_at) != sentinel {
            continue;
        }

        let key = format!("{}{}", cell(species_at), cell(sex_at));
        *notebook.counts.entry(key).or_insert(0) += 1;

        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        notebook.insert(ExperimentRecord {
            id: ExperimentId::new(cell(id_at)),
            fields,
        });
    }

    log::debug!(
        "notebook: kept {} of {} rows with {}={:?}",
        notebook.len(),
        seen,
        UNCOOPERATIVE_COLUMN,
        sentinel
    );

    Ok(notebook)
}

/// Open and parse a notebook file
pub fn load_notebook(path: &Path, sentinel: &str) -> Result<Notebook> {
    log::info!("Loading notebook {:?}", path);
    let file = File::open(path)?;
    parse_notebook(file, sentinel)
}
