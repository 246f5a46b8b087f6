//! FILENAME: core/summary-engine/src/diagnostics.rs
//! PURPOSE: Sink for data anomalies and progress events.
//! CONTEXT: Bad data never aborts a report. The engine and the sheet composers
//! describe what they skipped or coerced through this trait instead of printing;
//! the binary installs `LogDiagnostics`, tests install `RecordingDiagnostics`.

use std::sync::Mutex;

/// Something worth telling the operator about.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// A logical field name matched no column of the rows it was applied to.
    FieldUnresolved { field: String },
    /// A SUM input could not be read as a number and counted as 0.
    NonNumericValue { field: String, value: String },
    /// A row was left out of range grouping.
    RangeExcluded { field: String, value: String },
    /// A Summary-sheet identifier had no numeric prefix and went to group 0.
    UnparseableIdentifier { identifier: String },
    /// A worksheet finished a composition stage.
    Stage { sheet: String, stage: &'static str },
    /// A worksheet query returned.
    QueryCompleted { sheet: String, rows: usize },
}

impl DiagnosticEvent {
    /// Log category, matching the unified log format's category column.
    pub fn category(&self) -> &'static str {
        match self {
            DiagnosticEvent::FieldUnresolved { .. }
            | DiagnosticEvent::NonNumericValue { .. }
            | DiagnosticEvent::RangeExcluded { .. } => "DATA",
            DiagnosticEvent::UnparseableIdentifier { .. } => "SUMMARY",
            DiagnosticEvent::Stage { .. } => "SHEET",
            DiagnosticEvent::QueryCompleted { .. } => "QUERY",
        }
    }

    pub fn message(&self) -> String {
        match self {
            DiagnosticEvent::FieldUnresolved { field } => {
                format!("field '{}' not found in result rows", field)
            }
            DiagnosticEvent::NonNumericValue { field, value } => {
                format!("non-numeric value '{}' in '{}' counted as 0", value, field)
            }
            DiagnosticEvent::RangeExcluded { field, value } => {
                format!("value '{}' in '{}' outside every range bucket", value, field)
            }
            DiagnosticEvent::UnparseableIdentifier { identifier } => {
                format!("identifier '{}' has no numeric prefix, grouped under 0", identifier)
            }
            DiagnosticEvent::Stage { sheet, stage } => format!("[{}] {}", sheet, stage),
            DiagnosticEvent::QueryCompleted { sheet, rows } => {
                format!("[{}] query returned {} rows", sheet, rows)
            }
        }
    }

    fn is_anomaly(&self) -> bool {
        matches!(
            self,
            DiagnosticEvent::FieldUnresolved { .. }
                | DiagnosticEvent::NonNumericValue { .. }
                | DiagnosticEvent::UnparseableIdentifier { .. }
        )
    }
}

pub trait Diagnostics: Send + Sync {
    fn emit(&self, event: DiagnosticEvent);
}

/// Forwards events to the `log` facade, targeted by category.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn emit(&self, event: DiagnosticEvent) {
        let target = event.category();
        if event.is_anomaly() {
            log::warn!(target: target, "{}", event.message());
        } else {
            log::debug!(target: target, "{}", event.message());
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        RecordingDiagnostics::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Stage names recorded for one sheet, in order.
    pub fn stages_for(&self, sheet: &str) -> Vec<&'static str> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DiagnosticEvent::Stage { sheet: s, stage } if s == sheet => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn emit(&self, event: DiagnosticEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
