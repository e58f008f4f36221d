//! CLI command implementations
//!
//! Every command loads and validates the config, opens the dataset store
//! under `data_dir`, does one thing, and prints one JSON response line.
//! The `handle_*` and `build_*` functions hold the logic and are what the
//! tests drive; the command functions only add stdin/stdout.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::{Dataset, DatasetKind, DatasetRepository, DatasetStore, Room, Section};
use crate::executor::{QueryExecutor, MAX_RESULT_ROWS};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, Severity};
use crate::planner::QueryErrorCode;
use crate::scheduler::{SchedRoom, SchedSection, ScheduleReport, Scheduler};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{
    error_response, ok_response, read_request, write_error, write_response, write_value,
};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one file per dataset (required)
    pub data_dir: String,

    /// Most rows a query may return (optional, default 5000)
    #[serde(default = "default_max_result_rows")]
    pub max_result_rows: usize,

    /// Lowest log severity written to stderr (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_max_result_rows() -> usize {
    MAX_RESULT_ROWS
}
fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 4] = ["trace", "info", "warn", "error"];

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if self.max_result_rows == 0 {
            return Err(CliError::config_error("max_result_rows must be > 0"));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected one of: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Get data directory as Path
    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query { config } => query(&config),
        Command::List { config } => list(&config),
        Command::Add {
            config,
            id,
            kind,
            file,
        } => add(&config, &id, kind.into(), &file),
        Command::Remove { config, id } => remove(&config, &id),
        Command::Schedule {
            config,
            sections,
            rooms,
        } => schedule(&config, &sections, &rooms),
    }
}

/// Load config, apply its log level, and open the store
fn boot(config_path: &Path) -> CliResult<(Config, DatasetStore)> {
    let config = Config::load(config_path)?;
    Logger::set_min_severity(config.severity());
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("path", &config_path.display().to_string()),
            ("data_dir", &config.data_dir),
        ],
    );

    let store = DatasetStore::open(config.data_path())?;
    Ok((config, store))
}

/// Execute a single query read from stdin
pub fn query(config_path: &Path) -> CliResult<()> {
    let (config, store) = boot(config_path)?;
    let metrics = MetricsRegistry::new();
    metrics.add_datasets_loaded(store.ids().len() as u64);

    // Unparseable input is reported like any other invalid query
    let request = match read_request() {
        Ok(request) => request,
        Err(err) => return write_error(QueryErrorCode::InsightQueryInvalid.code(), err.message()),
    };

    let response = handle_query(&store, &config, &metrics, &request);
    write_value(&response)?;

    Logger::trace("QUERY_METRICS", &[("metrics", &metrics.to_json())]);
    Ok(())
}

/// Runs one query and builds its response body
pub fn handle_query(
    store: &DatasetStore,
    config: &Config,
    metrics: &MetricsRegistry,
    request: &Value,
) -> Value {
    let executor = QueryExecutor::new(store)
        .with_result_limit(config.max_result_rows)
        .with_metrics(metrics);

    match executor.execute_json(request) {
        Ok(output) => ok_response(output.to_json()),
        Err(err) => error_response(err.code().code(), err.message()),
    }
}

/// List stored datasets
pub fn list(config_path: &Path) -> CliResult<()> {
    let (_, store) = boot(config_path)?;
    write_response(serde_json::to_value(store.list())?)
}

/// Store a dataset from a record file
pub fn add(config_path: &Path, id: &str, kind: DatasetKind, file: &Path) -> CliResult<()> {
    let (_, store) = boot(config_path)?;
    let ids = handle_add(&store, id, kind, file)?;
    write_response(serde_json::to_value(ids)?)
}

/// Parses `file` as records of `kind` and stores them as dataset `id`.
///
/// Returns the ids of all stored datasets.
pub fn handle_add(
    store: &DatasetStore,
    id: &str,
    kind: DatasetKind,
    file: &Path,
) -> CliResult<Vec<String>> {
    let content = fs::read_to_string(file).map_err(|e| {
        CliError::io_error(format!("Failed to read {}: {}", file.display(), e))
    })?;
    let dataset = parse_records(id, kind, &content)?;
    Ok(store.insert(dataset)?)
}

fn parse_records(id: &str, kind: DatasetKind, content: &str) -> CliResult<Dataset> {
    let invalid = |e: serde_json::Error| {
        CliError::invalid_input(format!("Records are not a valid {} array: {}", kind, e))
    };
    let dataset = match kind {
        DatasetKind::Sections => {
            let sections: Vec<Section> = serde_json::from_str(content).map_err(invalid)?;
            Dataset::sections(id, sections)?
        }
        DatasetKind::Rooms => {
            let rooms: Vec<Room> = serde_json::from_str(content).map_err(invalid)?;
            Dataset::rooms(id, rooms)?
        }
    };
    Ok(dataset)
}

/// Delete a stored dataset
pub fn remove(config_path: &Path, id: &str) -> CliResult<()> {
    let (_, store) = boot(config_path)?;
    let removed = store.remove(id)?;
    write_response(Value::String(removed))
}

/// Schedule all sections of one dataset into rooms of another
pub fn schedule(config_path: &Path, sections_id: &str, rooms_id: &str) -> CliResult<()> {
    let (_, store) = boot(config_path)?;
    let metrics = MetricsRegistry::new();
    let report = build_schedule(&store, &metrics, sections_id, rooms_id)?;
    write_response(serde_json::to_value(&report)?)
}

/// Runs the scheduler over two stored datasets
pub fn build_schedule(
    store: &DatasetStore,
    metrics: &MetricsRegistry,
    sections_id: &str,
    rooms_id: &str,
) -> CliResult<ScheduleReport> {
    let sections = expect_kind(store, sections_id, DatasetKind::Sections)?;
    let rooms = expect_kind(store, rooms_id, DatasetKind::Rooms)?;

    let sections: Vec<SchedSection> = sections.iter_sections().map(SchedSection::from).collect();
    let rooms: Vec<SchedRoom> = rooms.iter_rooms().map(SchedRoom::from).collect();

    Ok(Scheduler::new()
        .with_metrics(metrics)
        .schedule_report(&sections, &rooms))
}

fn expect_kind(
    store: &DatasetStore,
    id: &str,
    kind: DatasetKind,
) -> CliResult<Arc<Dataset>> {
    let dataset = store.get(id)?;
    if dataset.kind() != kind {
        return Err(CliError::invalid_input(format!(
            "Dataset '{}' is {}, expected {}",
            id,
            dataset.kind(),
            kind
        )));
    }
    Ok(dataset)
}
