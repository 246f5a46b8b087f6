//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for report integration tests.

#![allow(dead_code)]

use engine::{CellValue, Row};
use persistence::{load_values, SheetValues};
use report_lib::{Cli, QueryError, QueryExecutor};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

// ============================================================================
// IN-MEMORY EXECUTOR
// ============================================================================

/// Answers queries from canned rows, matched by a substring of the query text.
pub struct FixtureExecutor {
    answers: Vec<(String, Vec<Row>)>,
    pub queries: Mutex<Vec<String>>,
}

impl FixtureExecutor {
    pub fn new() -> Self {
        FixtureExecutor {
            answers: Vec::new(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(mut self, needle: &str, rows: Vec<Row>) -> Self {
        self.answers.push((needle.to_string(), rows));
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

impl QueryExecutor for FixtureExecutor {
    fn execute(&self, query: &str) -> Result<Vec<Row>, QueryError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.answers
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| QueryError::new(query, "no such table"))
    }
}

/// A claim row with the standard seven columns plus turnaround days.
pub fn claim(policy: &str, issue: &str, resident: &str, company: &str, tat: f64) -> Row {
    Row::from_pairs([
        ("Policy_Num", CellValue::text(policy)),
        ("Claim_Num", CellValue::text(format!("C-{}", policy))),
        ("Product", CellValue::text("LTC")),
        ("Claim_Status", CellValue::text("Open")),
        ("Company", CellValue::text(company)),
        ("Issue_State", CellValue::text(issue)),
        ("Resident_State", CellValue::text(resident)),
        ("TAT_in_Days", CellValue::Number(tat)),
    ])
}

pub fn summary_entry(id: &str, description: &str, value: CellValue) -> Row {
    Row::from_pairs([
        ("Schedule_ID", CellValue::text(id)),
        ("Description", CellValue::text(description)),
        ("Value", value),
    ])
}

// ============================================================================
// ON-DISK FIXTURE
// ============================================================================

/// A temp directory holding a SQLite database, a config file and the output path.
pub struct ReportFixture {
    pub dir: TempDir,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
    pub output_path: PathBuf,
}

impl ReportFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("claims.db");
        let config_path = dir.path().join("report.yaml");
        let output_path = dir.path().join("report.xlsx");
        ReportFixture {
            dir,
            db_path,
            config_path,
            output_path,
        }
    }

    /// Creates CLAIMS and SUMMARY_TABLE with a small data set.
    pub fn with_sample_database() -> Self {
        let fixture = Self::new();
        let conn = Connection::open(&fixture.db_path).unwrap();
        conn.execute_batch(
            "CREATE TABLE CLAIMS (
                Policy_Num TEXT, Claim_Num TEXT, Product TEXT, Claim_Status TEXT,
                Company TEXT, Issue_State TEXT, Resident_State TEXT,
                TAT_in_Days INTEGER, Schedule_ID TEXT
             );
             CREATE TABLE SUMMARY_TABLE (Schedule_ID TEXT, Description TEXT, Value);",
        )
        .unwrap();

        let claims = [
            ("P1", "CA", "CA", "Acme", 10, "2-001"),
            ("P2", "CA", "NY", "Acme", 45, "2-001"),
            ("P3", "NY", "NY", "Beta", 91, "2-001"),
            ("P4", "CA", "CA", "Acme", 10, "2-003"),
            ("P5", "NY", "NY", "Beta", 45, "2-003"),
            ("P6", "TX", "TX", "Beta", 91, "2-003"),
            ("P7", "TX", "CA", "Beta", 200, "2-003"),
            ("P8", "WA", "OR", "Acme", 5, "1-001"),
            ("P9", "WA", "WA", "Acme", 5, "1-001"),
            ("P10", "CA", "CA", "Acme", 3, "X-1"),
            ("P11", "NY", "NY", "Beta", 3, "X-1"),
        ];
        for (policy, issue, resident, company, tat, schedule) in claims {
            conn.execute(
                "INSERT INTO CLAIMS VALUES (?1, ?2, 'LTC', 'Open', ?3, ?4, ?5, ?6, ?7)",
                params![policy, format!("C-{}", policy), company, issue, resident, tat, schedule],
            )
            .unwrap();
        }

        conn.execute_batch(
            "INSERT INTO SUMMARY_TABLE VALUES ('2-002', 'Claims closed', 'N/A');
             INSERT INTO SUMMARY_TABLE VALUES ('1-001', 'Policies in force', 1500);
             INSERT INTO SUMMARY_TABLE VALUES ('2-001', 'Claims open', 12);",
        )
        .unwrap();
        fixture
    }

    /// Writes a config whose connection points at the fixture database.
    pub fn write_config(&self, body: &str) {
        let text = format!(
            "connection:\n  path: \"{}\"\n{}",
            self.db_path.display(),
            body
        );
        std::fs::write(&self.config_path, text).unwrap();
    }

    pub fn cli(&self, extra: &[&str]) -> Cli {
        let config = self.config_path.display().to_string();
        let output = self.output_path.display().to_string();
        let mut args = vec![
            "schedule-report",
            "--config",
            config.as_str(),
            "--output",
            output.as_str(),
        ];
        args.extend_from_slice(extra);
        <Cli as clap::Parser>::try_parse_from(args).unwrap()
    }

    pub fn read_output(&self) -> Vec<SheetValues> {
        load_values(&self.output_path).unwrap()
    }
}

/// Finds a sheet by name in read-back output.
pub fn sheet<'a>(sheets: &'a [SheetValues], name: &str) -> &'a SheetValues {
    sheets
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("sheet {} missing", name))
}
