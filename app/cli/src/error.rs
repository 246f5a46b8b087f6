//! FILENAME: app/cli/src/error.rs

use engine::CoordError;
use persistence::PersistenceError;
use thiserror::Error;

/// Longest query text carried in a `QueryError`.
pub const MAX_QUERY_TEXT: usize = 200;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing connection setting '{field}' (set it in the config file or via {env_var})")]
    MissingConnectionField {
        field: &'static str,
        env_var: &'static str,
    },

    #[error("Worksheet '{sheet}': unknown template '{template}'")]
    UnknownTemplate { sheet: String, template: String },

    #[error("Invalid table name format: '{0}'")]
    InvalidTableName(String),

    #[error("Worksheet '{sheet}': {source}")]
    InvalidColumn {
        sheet: String,
        #[source]
        source: CoordError,
    },

    #[error("Worksheet '{sheet}': {message}")]
    InvalidWorksheet { sheet: String, message: String },
}

/// A query the data source rejected.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Query failed: {message} [query: {query}]")]
pub struct QueryError {
    /// Query text, truncated to `MAX_QUERY_TEXT` characters.
    pub query: String,
    pub message: String,
}

impl QueryError {
    pub fn new(query: &str, message: impl Into<String>) -> Self {
        QueryError {
            query: query.chars().take(MAX_QUERY_TEXT).collect(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Workbook error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Layout error: {0}")]
    Layout(#[from] CoordError),
}

impl ReportError {
    /// Process exit code: 2 for configuration problems, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::Config(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_truncates() {
        let long = format!("SELECT * FROM t WHERE x = '{}'", "a".repeat(500));
        let err = QueryError::new(&long, "no such table: t");
        assert_eq!(err.query.chars().count(), MAX_QUERY_TEXT);
        assert!(err.to_string().contains("no such table: t"));
    }

    #[test]
    fn test_exit_codes() {
        let config: ReportError = ConfigError::InvalidTableName("a;b".to_string()).into();
        assert_eq!(config.exit_code(), 2);
        let query: ReportError = QueryError::new("SELECT 1", "boom").into();
        assert_eq!(query.exit_code(), 1);
    }
}
