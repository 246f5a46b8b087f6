//! FILENAME: app/cli/src/executor.rs
// PURPOSE: Query execution seam between the report and its data source.
// CONTEXT: The executor is shared by the worker pool, so every call takes its
// own connection. Rows keep the column order of the result set.

use engine::{CellValue, Row};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use crate::error::QueryError;

/// Runs report queries. Implementations must tolerate concurrent calls.
pub trait QueryExecutor: Send + Sync {
    fn execute(&self, query: &str) -> Result<Vec<Row>, QueryError>;

    /// Releases held resources. Failures are reported to the caller, who only logs them.
    fn close(&self) -> Result<(), QueryError> {
        Ok(())
    }
}

// ============================================================================
// SQLITE
// ============================================================================

/// Read-only SQLite source; a fresh connection per query.
pub struct SqliteExecutor {
    path: PathBuf,
}

impl SqliteExecutor {
    pub fn new(path: &Path) -> Self {
        SqliteExecutor {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Connection::open_with_flags(&self.path, flags)
    }

    fn run(&self, query: &str) -> rusqlite::Result<Vec<Row>> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(query)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut result = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(sql_row) = rows.next()? {
            let mut row = Row::new();
            for (index, name) in names.iter().enumerate() {
                row.push(name.clone(), convert_value(sql_row.get_ref(index)?));
            }
            result.push(row);
        }
        Ok(result)
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, query: &str) -> Result<Vec<Row>, QueryError> {
        self.run(query).map_err(|e| QueryError::new(query, e.to_string()))
    }
}

fn convert_value(value: ValueRef<'_>) -> CellValue {
    match value {
        ValueRef::Null => CellValue::Empty,
        ValueRef::Integer(i) => CellValue::Number(i as f64),
        ValueRef::Real(f) => CellValue::Number(f),
        ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => CellValue::Text(format!("<blob {} bytes>", bytes.len())),
    }
}
