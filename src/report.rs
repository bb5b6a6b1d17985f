//! Report emission
//!
//! Joins the notebook with the aggregated action log and writes one
//! tab-separated row per experiment.

use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::actions::ActionLog;
use crate::durations::{bucket_intervals, TrimPolicy};
use crate::error::Result;
use crate::notebook::Notebook;

/// Rendered in place of a notebook field the row does not carry
pub const MISSING_FIELD: &str = "?";

/// Notebook columns and state totals that make up a report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLayout {
    pub experiment_fields: Vec<String>,
    pub action_states: Vec<String>,
}

impl Default for ReportLayout {
    fn default() -> Self {
        let experiment_fields = [
            "Id",
            "Date",
            "Species",
            "Sex",
            "Previously uncooperative",
            "Searched snowberry",
            "Searched apple",
            "Fed on apple",
            "Temperature (C)",
        ];
        let action_states = [
            "wall",
            "apple",
            "apple_search",
            "apple_rest",
            "snowberry",
            "snowberry_search",
            "snowberry_rest",
        ];

        Self {
            experiment_fields: experiment_fields.iter().map(|s| s.to_string()).collect(),
            action_states: action_states.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ReportLayout {
    /// Header line entries: notebook fields in snake case, then state names
    pub fn header(&self) -> Vec<String> {
        self.experiment_fields
            .iter()
            .map(|field| header_name(field))
            .chain(self.action_states.iter().cloned())
            .collect()
    }
}

/// `"Temperature (C)"` -> `"temperature_(c)"`
pub fn header_name(field: &str) -> String {
    field.to_lowercase().replace(' ', "_")
}

fn tsv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer)
}

/// Write the per-experiment time-on-state report.
///
/// Rows follow the action log's first-encountered order. An experiment in
/// the log but not in the notebook is an error.
pub fn write_report<W: Write>(
    writer: W,
    notebook: &Notebook,
    actions: &ActionLog,
    layout: &ReportLayout,
    trim: &TrimPolicy,
) -> Result<usize> {
    let mut out = tsv_writer(writer);
    out.write_record(layout.header())?;

    let mut rows = 0;
    for (experiment_id, intervals) in actions.iter() {
        let record = notebook.require(experiment_id)?;
        let durations = bucket_intervals(intervals, trim);

        let row = layout
            .experiment_fields
            .iter()
            .map(|field| record.field_or(field, MISSING_FIELD).to_string())
            .chain(
                layout
                    .action_states
                    .iter()
                    .map(|state| durations.get(state).to_string()),
            );
        out.write_record(row)?;
        rows += 1;
    }

    out.flush()?;
    log::debug!("report: wrote {} rows", rows);
    Ok(rows)
}

/// Write every interval as `experiment_id<TAB>label<TAB>seconds`
pub fn write_intervals<W: Write>(writer: W, actions: &ActionLog) -> Result<usize> {
    let mut out = tsv_writer(writer);

    let mut rows = 0;
    for (experiment_id, intervals) in actions.iter() {
        for interval in intervals {
            out.write_record([
                experiment_id.as_str(),
                interval.label.as_str(),
                interval.duration_sec.to_string().as_str(),
            ])?;
            rows += 1;
        }
    }

    out.flush()?;
    Ok(rows)
}

/// Render species+sex counts as `key: count` lines
pub fn format_counts(counts: &BTreeMap<String, usize>) -> String {
    counts
        .iter()
        .map(|(key, count)| format!("  {}: {}\n", key, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::parse_actions;
    use crate::error::NotebookError;
    use crate::notebook::parse_notebook;
    use pretty_assertions::assert_eq;

    const NOTEBOOK: &str = "\
Id,Date,Species,Sex,Uncooperative,Temperature (C)
1,2013-06-01,A,F,N,21.5
2,2013-06-01,B,M,N,22.0
";

    const ACTIONS: &str = "\
1\tstart\t2013-06-01 10:00:00.1
1\twall\t2013-06-01 10:00:00.9
1\tapple_search\t2013-06-01 10:00:05.2
1\tapple_rest\t2013-06-01 10:00:15.0
1\twall\t2013-06-01 10:00:35.7
1\tend\t2013-06-01 10:00:38.0
2\tstart\t2013-06-01 11:00:00
2\tsnowberry_search\t2013-06-01 11:00:04
2\twall\t2013-06-01 11:00:10
";

    fn small_layout() -> ReportLayout {
        ReportLayout {
            experiment_fields: vec!["Id".into(), "Species".into(), "Temperature (C)".into()],
            action_states: vec!["wall".into(), "apple".into(), "snowberry".into()],
        }
    }

    #[test]
    fn test_header_name() {
        assert_eq!(header_name("Previously uncooperative"), "previously_uncooperative");
        assert_eq!(header_name("Temperature (C)"), "temperature_(c)");
    }

    #[test]
    fn test_default_layout_header() {
        let header = ReportLayout::default().header();
        assert_eq!(header.len(), 16);
        assert_eq!(header[0], "id");
        assert_eq!(header[8], "temperature_(c)");
        assert_eq!(header[9], "wall");
        assert_eq!(header[15], "snowberry_rest");
    }

    #[test]
    fn test_write_report_rows() {
        let notebook = parse_notebook(NOTEBOOK.as_bytes(), "N").unwrap();
        let actions = parse_actions(ACTIONS.as_bytes(), Some(&notebook)).unwrap();

        let mut out = Vec::new();
        let rows = write_report(
            &mut out,
            &notebook,
            &actions,
            &small_layout(),
            &TrimPolicy::default(),
        )
        .unwrap();

        // Experiment 1: [start 0, wall 5, apple_search 10, apple_rest 20, wall 3]
        // Experiment 2: [start 4, snowberry_search 6]
        assert_eq!(rows, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id\tspecies\ttemperature_(c)\twall\tapple\tsnowberry\n\
             1\tA\t21.5\t5\t30\t0\n\
             2\tB\t22.0\t0\t0\t6\n"
        );
    }

    #[test]
    fn test_missing_report_field_renders_placeholder() {
        let notebook = parse_notebook(NOTEBOOK.as_bytes(), "N").unwrap();
        let actions = parse_actions(ACTIONS.as_bytes(), Some(&notebook)).unwrap();
        let layout = ReportLayout {
            experiment_fields: vec!["Id".into(), "Fed on apple".into()],
            action_states: vec![],
        };

        let mut out = Vec::new();
        write_report(&mut out, &notebook, &actions, &layout, &TrimPolicy::default()).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1), Some("1\t?"));
    }

    #[test]
    fn test_unknown_experiment_is_fatal() {
        let notebook = parse_notebook("Id,Species,Sex,Uncooperative\n1,A,F,N\n".as_bytes(), "N")
            .unwrap();
        let actions = parse_actions::<_, Notebook>(ACTIONS.as_bytes(), None).unwrap();

        let result = write_report(
            Vec::<u8>::new(),
            &notebook,
            &actions,
            &small_layout(),
            &TrimPolicy::default(),
        );
        assert!(matches!(result, Err(NotebookError::UnknownExperiment(id)) if id == "2"));
    }

    #[test]
    fn test_fully_trimmed_experiment_keeps_zero_row() {
        let notebook = parse_notebook(NOTEBOOK.as_bytes(), "N").unwrap();
        let actions = parse_actions(
            "1\tstart\t2013-06-01 10:00:00\n1\twall\t2013-06-01 10:00:04\n1\tend\t2013-06-01 10:00:09\n"
                .as_bytes(),
            Some(&notebook),
        )
        .unwrap();

        let mut out = Vec::new();
        let rows = write_report(
            &mut out,
            &notebook,
            &actions,
            &small_layout(),
            &TrimPolicy::default(),
        )
        .unwrap();

        // [start 4, wall 5]: the trailing wall and the leading start both go
        assert_eq!(rows, 1);
        assert_eq!(String::from_utf8(out).unwrap().lines().nth(1), Some("1\tA\t21.5\t0\t0\t0"));
    }

    #[test]
    fn test_write_intervals() {
        let actions = parse_actions::<_, Notebook>(
            "4\tstart\t2013-06-01 10:00:00\n4\twall\t2013-06-01 10:00:03\n4\twall\t2013-06-01 10:00:04\n"
                .as_bytes(),
            None,
        )
        .unwrap();

        let mut out = Vec::new();
        assert_eq!(write_intervals(&mut out, &actions).unwrap(), 2);
        assert_eq!(String::from_utf8(out).unwrap(), "4\tstart\t3\n4\twall\t1\n");
    }

    #[test]
    fn test_format_counts() {
        let counts: BTreeMap<String, usize> =
            [("AF".to_string(), 3), ("BM".to_string(), 1)].into_iter().collect();
        assert_eq!(format_counts(&counts), "  AF: 3\n  BM: 1\n");
    }
}
