//! FILENAME: app/cli/src/cli.rs
// PURPOSE: Command-line surface and the top-level run sequence.

use clap::Parser;
use std::path::PathBuf;
use summary_engine::LogDiagnostics;

use crate::config::load_config;
use crate::error::ReportError;
use crate::executor::{QueryExecutor, SqliteExecutor};
use crate::period::{reporting_period, DEFAULT_REPORTING_PERIOD};
use crate::report::{generate_report, ReportOptions};

#[derive(Parser, Debug)]
#[command(
    name = "schedule-report",
    about = "Generate a multi-worksheet schedule report workbook from query results."
)]
pub struct Cli {
    /// YAML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Workbook to write.
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// Reporting period start (YYYY-MM-DD, MM/DD/YYYY, "January 1, 2024", ...).
    #[arg(long = "report-start-dt")]
    pub report_start_dt: Option<String>,

    /// Reporting period end.
    #[arg(long = "report-end-dt")]
    pub report_end_dt: Option<String>,

    /// Database prefix for unqualified table names.
    #[arg(long)]
    pub database: Option<String>,

    /// Schema prefix for unqualified table names.
    #[arg(long)]
    pub schema: Option<String>,

    /// Also append log lines to this file.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log debug detail (queries, stages).
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    pub fn reporting_period(&self) -> String {
        match (&self.report_start_dt, &self.report_end_dt) {
            (Some(start), Some(end)) => reporting_period(start, end),
            (None, None) => DEFAULT_REPORTING_PERIOD.to_string(),
            _ => {
                log::warn!(
                    target: "CLI",
                    "Both --report-start-dt and --report-end-dt are needed; using the default period"
                );
                DEFAULT_REPORTING_PERIOD.to_string()
            }
        }
    }
}

/// Loads the configuration, runs the report against SQLite and closes the executor.
pub fn run(cli: &Cli) -> Result<Vec<String>, ReportError> {
    let period = cli.reporting_period();
    log::info!(target: "CLI", "Reporting Period: {}", period);

    log::info!(target: "CLI", "Loading configuration from {}", cli.config.display());
    let config = load_config(&cli.config)?;
    log::info!(
        target: "CLI",
        "Found {} worksheet(s){}",
        config.worksheets.len(),
        config
            .summary
            .as_ref()
            .map(|s| format!(", summary table {}", s.table_name))
            .unwrap_or_default()
    );

    let options = ReportOptions {
        output: cli.output.clone(),
        reporting_period: period,
        database: cli.database.clone(),
        schema: cli.schema.clone(),
    };

    let executor = SqliteExecutor::new(&config.connection.path);
    let result = generate_report(&config, &executor, &options, &LogDiagnostics);

    if let Err(e) = executor.close() {
        log::warn!(target: "CLI", "Error closing connection: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "schedule-report",
            "--config",
            "config.yaml",
            "--output",
            "out.xlsx",
            "--report-start-dt",
            "2024-01-01",
            "--report-end-dt",
            "12/31/2024",
            "--schema",
            "LTC",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert_eq!(cli.schema.as_deref(), Some("LTC"));
        assert!(!cli.verbose);
        assert_eq!(cli.reporting_period(), "January 1, 2024 through December 31, 2024");
    }

    #[test]
    fn test_config_and_output_required() {
        assert!(Cli::try_parse_from(["schedule-report", "--output", "out.xlsx"]).is_err());
        assert!(Cli::try_parse_from(["schedule-report", "--config", "c.yaml"]).is_err());
    }

    #[test]
    fn test_default_period_without_dates() {
        let cli = Cli::try_parse_from(["schedule-report", "--config", "c.yaml", "--output", "o.xlsx"]).unwrap();
        assert_eq!(cli.reporting_period(), DEFAULT_REPORTING_PERIOD);
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let cli = Cli::try_parse_from([
            "schedule-report",
            "--config",
            "/nonexistent/report.yaml",
            "--output",
            "o.xlsx",
        ])
        .unwrap();
        let err = run(&cli).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
