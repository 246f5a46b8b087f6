//! FILENAME: core/summary-engine/src/lib.rs
//! Summary table subsystem for the report generator.
//!
//! Turns the rows returned by one worksheet query into small grouped summary
//! tables (counts, sums, averages, percent of total, grand total). It depends
//! on `engine` only for shared types (CellValue, Row).
//!
//! Layers:
//! - `definition`: What a summary IS (aggregate and grouping configuration)
//! - `resolver`: Tolerant lookup of logical field names in query rows
//! - `range`: Turnaround-time bucket classification
//! - `engine`: Grouping and aggregation (HOW we calculate)
//! - `columns`: Display column to query field mapping for detail tables
//! - `diagnostics`: Injected sink for data anomalies and progress events

pub mod columns;
pub mod definition;
pub mod diagnostics;
pub mod engine;
pub mod range;
pub mod resolver;

pub use columns::{map_columns, ColumnMapping};
pub use definition::*;
pub use diagnostics::{DiagnosticEvent, Diagnostics, LogDiagnostics, RecordingDiagnostics};
pub use engine::{aggregate, coerce_number, SummaryCalculator};
pub use range::{classify, RangeBucket};
pub use resolver::{normalize_field_name, resolve, resolve_key};
