//! Notebook CLI - time-on-state reports from a lab notebook and action log
//!
//! Modes, selected by the positional arguments:
//! - `notebook NOTEBOOK`: species+sex counts of cooperative and uncooperative subjects
//! - `notebook NOTEBOOK ACTIONS`: report on stdout
//! - `notebook NOTEBOOK ACTIONS OUTPUT`: report written to OUTPUT

use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use notebook_actions::config::{load_config, RunConfig};
use notebook_actions::pipeline::NotebookProcessor;
use notebook_actions::report::format_counts;
use notebook_actions::{NotebookError, VERSION};

/// Aggregate behavioral action logs into per-experiment time-on-state reports
#[derive(Parser)]
#[command(name = "notebook")]
#[command(version = VERSION)]
#[command(about = "Summarize time spent per state for each notebook experiment", long_about = None)]
struct Cli {
    /// Lab notebook (CSV with Id, Species, Sex and Uncooperative columns)
    #[arg(value_name = "NOTEBOOK")]
    notebook: PathBuf,

    /// Action log (TSV: experiment id, state label, timestamp)
    #[arg(value_name = "ACTIONS")]
    actions: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(value_name = "OUTPUT", requires = "actions")]
    output: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Uncooperative value of the experiments to include
    #[arg(long, value_name = "VALUE")]
    sentinel: Option<String>,

    /// Also discard a leading wall interval
    #[arg(long)]
    drop_leading_wall: bool,

    /// Keep a leading start interval
    #[arg(long)]
    keep_leading_start: bool,

    /// Emit one line per interval instead of the per-experiment report
    #[arg(long)]
    intervals: bool,

    /// Print counts as JSON (counts mode only)
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all logging except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), NotebookCliError> {
    let config = resolve_config(&cli)?;
    let processor = NotebookProcessor::new(config);

    match &cli.actions {
        None => cmd_counts(&processor, &cli.notebook, cli.json),
        Some(actions) => cmd_report(
            &processor,
            &cli.notebook,
            actions,
            cli.output.as_deref(),
            cli.intervals,
        ),
    }
}

/// Config file first, then command-line overrides
fn resolve_config(cli: &Cli) -> Result<RunConfig, NotebookCliError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RunConfig::default(),
    };

    if let Some(sentinel) = &cli.sentinel {
        config.cooperative_sentinel = sentinel.clone();
    }
    if cli.drop_leading_wall {
        config.trim.drop_leading_wall = true;
    }
    if cli.keep_leading_start {
        config.trim.drop_leading_start = false;
    }

    log::debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn cmd_counts(processor: &NotebookProcessor, notebook: &Path, json: bool) -> Result<(), NotebookCliError> {
    let counts = processor.cooperativeness_counts(notebook)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        println!("Cooperative");
        print!("{}", format_counts(&counts.cooperative));
        println!("Uncooperative");
        print!("{}", format_counts(&counts.uncooperative));
    }

    Ok(())
}

fn cmd_report(
    processor: &NotebookProcessor,
    notebook: &Path,
    actions: &Path,
    output: Option<&Path>,
    intervals: bool,
) -> Result<(), NotebookCliError> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let rows = if intervals {
        processor.intervals(notebook, actions, writer)?
    } else {
        processor.report(notebook, actions, writer)?
    };

    match output {
        Some(path) => log::info!("Wrote {} rows to {:?}", rows, path),
        None => log::info!("Wrote {} rows", rows),
    }
    Ok(())
}

/// Initialize logging based on verbosity level; `RUST_LOG` takes precedence
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

// Error types

#[derive(Debug)]
enum NotebookCliError {
    Io(io::Error),
    Notebook(NotebookError),
    Json(serde_json::Error),
}

impl From<io::Error> for NotebookCliError {
    fn from(e: io::Error) -> Self {
        NotebookCliError::Io(e)
    }
}

impl From<NotebookError> for NotebookCliError {
    fn from(e: NotebookError) -> Self {
        NotebookCliError::Notebook(e)
    }
}

impl From<serde_json::Error> for NotebookCliError {
    fn from(e: serde_json::Error) -> Self {
        NotebookCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<NotebookCliError> for CliError {
    fn from(e: NotebookCliError) -> Self {
        match e {
            NotebookCliError::Io(e) | NotebookCliError::Notebook(NotebookError::Io(e)) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            NotebookCliError::Notebook(e) => {
                let (code, hint) = match &e {
                    NotebookError::Csv(_) | NotebookError::MalformedRow { .. } => {
                        ("PARSE_ERROR", "Check the delimiter and column count of the input")
                    }
                    NotebookError::MissingColumn(_) => (
                        "MISSING_COLUMN",
                        "The notebook needs Id, Species, Sex and Uncooperative columns",
                    ),
                    NotebookError::TimestampError { .. } => {
                        ("TIMESTAMP_ERROR", "Timestamps must look like 2013-06-01 14:05:09[.fraction]")
                    }
                    NotebookError::UnknownExperiment(_) => (
                        "UNKNOWN_EXPERIMENT",
                        "Every experiment in the action log must have a notebook row",
                    ),
                    NotebookError::ConfigError(_) => ("CONFIG_ERROR", "Check the configuration file"),
                    NotebookError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            NotebookCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
        }
    }
}
