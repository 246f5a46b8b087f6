//! FILENAME: app/cli/src/report.rs
// PURPOSE: Runs a whole report: queries, aggregation, composition, save.
// CONTEXT: Queries and aggregation run in the shared worker pool; results are
// collected by submission index so sheet order always follows the
// configuration. Composition is sequential and the file is written last, so a
// failed query never leaves a partial workbook behind.

use engine::Row;
use persistence::{save_xlsx, Workbook};
use std::path::{Path, PathBuf};
use summary_engine::{DiagnosticEvent, Diagnostics, SummaryRow};

use crate::composer::{aggregate_worksheet, compose_worksheet, stage, STAGE_FETCHED};
use crate::config::ReportConfig;
use crate::error::{QueryError, ReportError};
use crate::executor::QueryExecutor;
use crate::period::DEFAULT_REPORTING_PERIOD;
use crate::pool::WorkerPool;
use crate::qualify::qualify_tables;
use crate::summary_sheet::{summary_query, write_summary_sheet, SUMMARY_SHEET_NAME};

/// Per-run settings that do not come from the configuration file.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub output: PathBuf,
    pub reporting_period: String,
    /// Override the configured qualifiers for unqualified table names.
    pub database: Option<String>,
    pub schema: Option<String>,
}

impl ReportOptions {
    pub fn new(output: &Path) -> Self {
        ReportOptions {
            output: output.to_path_buf(),
            reporting_period: DEFAULT_REPORTING_PERIOD.to_string(),
            database: None,
            schema: None,
        }
    }
}

/// One query of the fetch phase.
struct QueryJob {
    sheet: String,
    query: String,
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Builds the workbook and writes it to `options.output`. Returns the sheet names written.
pub fn generate_report(
    config: &ReportConfig,
    executor: &dyn QueryExecutor,
    options: &ReportOptions,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<String>, ReportError> {
    log::info!(target: "REPORT", "ENTER generate_report output={}", options.output.display());

    let workbook = build_workbook(config, executor, options, diagnostics)?;
    save_xlsx(&workbook, &options.output)?;

    let names: Vec<String> = workbook.sheet_names().iter().map(|s| s.to_string()).collect();
    log::info!(
        target: "REPORT",
        "EXIT generate_report sheets={} output={}",
        names.len(),
        options.output.display()
    );
    Ok(names)
}

/// Runs every phase except saving.
pub fn build_workbook(
    config: &ReportConfig,
    executor: &dyn QueryExecutor,
    options: &ReportOptions,
    diagnostics: &dyn Diagnostics,
) -> Result<Workbook, ReportError> {
    let pool = WorkerPool::new(config.max_queries);
    log::debug!(target: "REPORT", "Worker pool size {}", pool.size());

    let database = options.database.as_deref().or(config.connection.database.as_deref());
    let schema = options.schema.as_deref().or(config.connection.schema.as_deref());

    // Phase 1: fetch. The Summary source, when configured, is job 0.
    let mut jobs = Vec::new();
    if let Some(summary) = &config.summary {
        jobs.push(QueryJob {
            sheet: SUMMARY_SHEET_NAME.to_string(),
            query: qualify_tables(&summary_query(&summary.table_name), database, schema),
        });
    }
    for spec in &config.worksheets {
        jobs.push(QueryJob {
            sheet: spec.name.clone(),
            query: qualify_tables(&spec.query, database, schema),
        });
    }

    let mut results = pool.try_map(&jobs, |_, job| run_job(job, executor, diagnostics))?;
    let summary_rows = match config.summary {
        Some(_) => Some(results.remove(0)),
        None => None,
    };
    let worksheet_rows = results;

    for spec in &config.worksheets {
        stage(diagnostics, spec, STAGE_FETCHED);
    }

    // Phase 2: aggregate
    let aggregated: Vec<Vec<Vec<SummaryRow>>> = pool.map(&config.worksheets, |index, spec| {
        aggregate_worksheet(spec, &worksheet_rows[index], diagnostics)
    });

    // Phase 3: compose in configured order
    let mut workbook = Workbook::new();

    if let (Some(summary), Some(rows)) = (&config.summary, &summary_rows) {
        let sheet = workbook.add_sheet(SUMMARY_SHEET_NAME)?;
        write_summary_sheet(sheet, rows, summary, &options.reporting_period, diagnostics);
    }

    for ((spec, rows), tables) in config.worksheets.iter().zip(&worksheet_rows).zip(&aggregated) {
        let sheet = workbook.add_sheet(&spec.name)?;
        compose_worksheet(sheet, spec, rows, tables, diagnostics)?;
    }

    Ok(workbook)
}

fn run_job(
    job: &QueryJob,
    executor: &dyn QueryExecutor,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<Row>, QueryError> {
    log::debug!(target: "QUERY", "[{}] {}", job.sheet, job.query);
    let rows = executor.execute(&job.query).map_err(|e| {
        log::error!(target: "QUERY", "[{}] {}", job.sheet, e);
        e
    })?;
    diagnostics.emit(DiagnosticEvent::QueryCompleted {
        sheet: job.sheet.clone(),
        rows: rows.len(),
    });
    Ok(rows)
}
