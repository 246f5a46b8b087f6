//! FILENAME: app/cli/src/config.rs
// PURPOSE: Loads the YAML report configuration into a validated ReportConfig.
// CONTEXT: Connection settings may come from the environment, which wins over
// the file. Worksheet entries are either a bare table name (fixed layout by
// worksheet name) or a template object.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::legacy::{legacy_worksheet, SUMMARY_SHEET_KEY};
use crate::templates::{self, TemplateEntry};
use crate::worksheet::WorksheetSpec;

pub const ENV_DB_PATH: &str = "REPORT_DB_PATH";
pub const ENV_DATABASE: &str = "REPORT_DATABASE";
pub const ENV_SCHEMA: &str = "REPORT_SCHEMA";

pub const DEFAULT_MAX_QUERIES: usize = 4;
pub const DEFAULT_LINE_OF_BUSINESS: &str = "Individual Long-Term Care";
pub const DEFAULT_FILING_DEADLINE: &str = "n/a";
pub const DEFAULT_DATA_SOURCE: &str = "Snowflake";

// ============================================================================
// TYPED CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSettings {
    /// SQLite database file.
    pub path: PathBuf,
    /// Qualifier applied to unqualified table names.
    pub database: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySheetConfig {
    pub table_name: String,
    /// Title per schedule number, overriding the built-in titles.
    pub schedule_titles: BTreeMap<u32, String>,
    pub line_of_business: String,
    pub filing_deadline: String,
    pub data_source: String,
}

impl SummarySheetConfig {
    pub fn new(table_name: &str) -> Self {
        SummarySheetConfig {
            table_name: table_name.to_string(),
            schedule_titles: BTreeMap::new(),
            line_of_business: DEFAULT_LINE_OF_BUSINESS.to_string(),
            filing_deadline: DEFAULT_FILING_DEADLINE.to_string(),
            data_source: DEFAULT_DATA_SOURCE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub connection: ConnectionSettings,
    /// Worksheets in configured order.
    pub worksheets: Vec<WorksheetSpec>,
    pub summary: Option<SummarySheetConfig>,
    pub max_queries: usize,
}

// ============================================================================
// RAW YAML SHAPE
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    connection: RawConnection,
    #[serde(default)]
    worksheets: Mapping,
    #[serde(default)]
    summary: Option<RawSummary>,
    #[serde(default)]
    concurrency: RawConcurrency,
}

#[derive(Debug, Default, Deserialize)]
struct RawConnection {
    path: Option<String>,
    database: Option<String>,
    schema: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSummary {
    table_name: Option<String>,
    #[serde(default)]
    schedule_titles: Mapping,
    line_of_business: Option<String>,
    filing_deadline: Option<String>,
    data_source: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConcurrency {
    max_queries: Option<usize>,
}

/// One value under `worksheets`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WorksheetEntry {
    Table(String),
    Template(TemplateEntry),
}

// ============================================================================
// LOADING
// ============================================================================

/// Reads and validates the configuration file, applying environment overrides.
pub fn load_config(path: &Path) -> Result<ReportConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text, |key| std::env::var(key).ok())
}

/// Parses configuration text. `env` looks up override variables.
pub fn parse_config<F>(text: &str, env: F) -> Result<ReportConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw: RawConfig = if text.trim().is_empty() {
        RawConfig::default()
    } else {
        serde_yaml::from_str(text)?
    };

    let connection = resolve_connection(raw.connection, &env)?;
    let worksheets = build_worksheets(&raw.worksheets)?;
    let summary = match raw.summary {
        Some(summary) => build_summary(summary)?,
        None => None,
    };
    let max_queries = raw
        .concurrency
        .max_queries
        .unwrap_or(DEFAULT_MAX_QUERIES)
        .max(1);

    log::debug!(
        target: "CONFIG",
        "Loaded {} worksheet(s), summary sheet: {}, max queries: {}",
        worksheets.len(),
        summary.is_some(),
        max_queries
    );

    Ok(ReportConfig {
        connection,
        worksheets,
        summary,
        max_queries,
    })
}

fn resolve_connection<F>(raw: RawConnection, env: &F) -> Result<ConnectionSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let pick = |var: &str, file: Option<String>| {
        env(var)
            .filter(|v| !v.trim().is_empty())
            .or(file)
            .filter(|v| !v.trim().is_empty())
    };

    let path = pick(ENV_DB_PATH, raw.path).ok_or(ConfigError::MissingConnectionField {
        field: "path",
        env_var: ENV_DB_PATH,
    })?;

    Ok(ConnectionSettings {
        path: PathBuf::from(path),
        database: pick(ENV_DATABASE, raw.database),
        schema: pick(ENV_SCHEMA, raw.schema),
    })
}

fn build_worksheets(entries: &Mapping) -> Result<Vec<WorksheetSpec>, ConfigError> {
    let mut worksheets = Vec::new();

    for (key, value) in entries {
        let name = key_to_string(key).ok_or_else(|| ConfigError::InvalidWorksheet {
            sheet: format!("{:?}", key),
            message: "worksheet names must be strings or numbers".to_string(),
        })?;
        if name == SUMMARY_SHEET_KEY {
            continue;
        }

        let entry: WorksheetEntry =
            serde_yaml::from_value(value.clone()).map_err(|e| ConfigError::InvalidWorksheet {
                sheet: name.clone(),
                message: e.to_string(),
            })?;

        let spec = match entry {
            WorksheetEntry::Table(table) => {
                validate_table_name(&table)?;
                match legacy_worksheet(&name, &table) {
                    Some(spec) => spec,
                    None => {
                        log::warn!(target: "CONFIG", "Unknown worksheet name '{}', skipping", name);
                        continue;
                    }
                }
            }
            WorksheetEntry::Template(entry) => templates::expand(&name, &entry)?,
        };

        spec.validate()?;
        worksheets.push(spec);
    }

    Ok(worksheets)
}

fn build_summary(raw: RawSummary) -> Result<Option<SummarySheetConfig>, ConfigError> {
    let table_name = match raw.table_name.filter(|t| !t.trim().is_empty()) {
        Some(table) => table,
        None => return Ok(None),
    };
    validate_table_name(&table_name)?;

    let mut summary = SummarySheetConfig::new(&table_name);
    for (key, value) in &raw.schedule_titles {
        let number = key_to_string(key).and_then(|k| k.trim().parse::<u32>().ok());
        match (number, value.as_str()) {
            (Some(n), Some(title)) => {
                summary.schedule_titles.insert(n, title.to_string());
            }
            _ => log::warn!(target: "CONFIG", "Ignoring schedule title entry {:?}", key),
        }
    }
    if let Some(lob) = raw.line_of_business {
        summary.line_of_business = lob;
    }
    if let Some(deadline) = raw.filing_deadline {
        summary.filing_deadline = deadline;
    }
    if let Some(source) = raw.data_source {
        summary.data_source = source;
    }
    Ok(Some(summary))
}

fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Table names may hold ASCII letters, digits, `_` and `.` (for `schema.table`).
pub fn validate_table_name(table: &str) -> Result<(), ConfigError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidTableName(table.to_string()))
    }
}
