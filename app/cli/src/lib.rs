//! FILENAME: app/cli/src/lib.rs
// PURPOSE: Library entry point for the schedule report generator.
// CONTEXT: The binary in main.rs is a thin wrapper around `cli::run`.
// Integration tests drive `report::generate_report` with their own executors.

pub mod cli;
pub mod composer;
pub mod config;
pub mod error;
pub mod executor;
pub mod legacy;
pub mod logging;
pub mod period;
pub mod pool;
pub mod qualify;
pub mod report;
pub mod summary_sheet;
pub mod templates;
pub mod worksheet;

pub use cli::{run, Cli};
pub use config::{load_config, parse_config, ConnectionSettings, ReportConfig, SummarySheetConfig};
pub use error::{ConfigError, QueryError, ReportError};
pub use executor::{QueryExecutor, SqliteExecutor};
pub use report::{build_workbook, generate_report, ReportOptions};
pub use worksheet::WorksheetSpec;
