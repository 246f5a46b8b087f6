//! FILENAME: core/summary-engine/src/definition.rs
//! Summary Definition - The configuration of one summary table.
//!
//! This module contains the types needed to DESCRIBE a summary table and the
//! rows it produces. Definitions are built by the template layer and are
//! immutable while a report runs.

use engine::CellValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output column whose values are computed from the first aggregate.
pub const PERCENT_OF_TOTAL: &str = "% of Total";

/// Label written in the group column of the grand-total row.
pub const GRAND_TOTAL_LABEL: &str = "Grand Total";

/// Field bucketed by default when grouping by range.
pub const DEFAULT_RANGE_FIELD: &str = "TAT_in_Days";

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for summary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    First,
}

impl Default for AggregateFunction {
    fn default() -> Self {
        AggregateFunction::Count
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
            AggregateFunction::First => "FIRST",
        };
        f.write_str(name)
    }
}

impl FromStr for AggregateFunction {
    type Err = String;

    /// Case-insensitive; `AVERAGE` is accepted for `AVG`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COUNT" => Ok(AggregateFunction::Count),
            "SUM" => Ok(AggregateFunction::Sum),
            "AVG" | "AVERAGE" => Ok(AggregateFunction::Avg),
            "MIN" => Ok(AggregateFunction::Min),
            "MAX" => Ok(AggregateFunction::Max),
            "FIRST" => Ok(AggregateFunction::First),
            other => Err(format!("unknown aggregate function '{}'", other)),
        }
    }
}

/// One computed column of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSpec {
    /// Source field. Empty means "count records" for COUNT.
    pub field: String,
    pub function: AggregateFunction,
    /// Output column label the value is stored under.
    pub label: String,
}

impl AggregateSpec {
    pub fn new(field: &str, function: AggregateFunction, label: &str) -> Self {
        AggregateSpec {
            field: field.to_string(),
            function,
            label: label.to_string(),
        }
    }

    pub fn count_records(label: &str) -> Self {
        AggregateSpec::new("", AggregateFunction::Count, label)
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// How rows are partitioned into groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupBy {
    /// Group by the display form of a field's value.
    Field(String),
    /// Group by turnaround-time bucket of a numeric field.
    RangeBucketed { field: String },
}

impl GroupBy {
    /// Parses a configured group-by value. `TAT_Range` and `range-bucketed`
    /// select range grouping over the default field.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("TAT_Range") || trimmed.eq_ignore_ascii_case("range-bucketed") {
            GroupBy::RangeBucketed {
                field: DEFAULT_RANGE_FIELD.to_string(),
            }
        } else {
            GroupBy::Field(trimmed.to_string())
        }
    }

    pub fn is_range_bucketed(&self) -> bool {
        matches!(self, GroupBy::RangeBucketed { .. })
    }

    pub fn field(&self) -> &str {
        match self {
            GroupBy::Field(f) => f,
            GroupBy::RangeBucketed { field } => field,
        }
    }
}

// ============================================================================
// SUMMARY SPEC
// ============================================================================

/// Complete description of one summary table on a worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySpec {
    pub group_by: GroupBy,
    pub aggregates: Vec<AggregateSpec>,
    /// Column letter of the table's top-left cell.
    pub anchor_column: String,
    /// Header texts. `[0]` heads the group column; the rest are aggregate
    /// labels or the computed `"% of Total"`.
    pub output_columns: Vec<String>,
    /// Explicit grand-total switch; `None` applies the default policy.
    #[serde(default)]
    pub grand_total: Option<bool>,
}

impl SummarySpec {
    pub fn new(group_by: GroupBy, anchor_column: &str, output_columns: &[&str]) -> Self {
        SummarySpec {
            group_by,
            aggregates: Vec::new(),
            anchor_column: anchor_column.to_string(),
            output_columns: output_columns.iter().map(|c| c.to_string()).collect(),
            grand_total: None,
        }
    }

    pub fn with_aggregate(mut self, aggregate: AggregateSpec) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    pub fn with_grand_total(mut self, enabled: bool) -> Self {
        self.grand_total = Some(enabled);
        self
    }

    pub fn wants_percent_of_total(&self) -> bool {
        self.output_columns.iter().any(|c| c == PERCENT_OF_TOTAL)
    }

    /// Explicit setting first; otherwise state-like and range groupings get a
    /// grand total and everything else does not.
    pub fn wants_grand_total(&self) -> bool {
        if let Some(explicit) = self.grand_total {
            return explicit;
        }
        match &self.group_by {
            GroupBy::RangeBucketed { .. } => true,
            GroupBy::Field(field) => crate::resolver::normalize_field_name(field).contains("STATE"),
        }
    }

    /// Number of columns the table occupies.
    pub fn width(&self) -> usize {
        self.output_columns.len()
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// One output row of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub group_label: String,
    /// Aggregate label to value, in aggregate order.
    pub values: Vec<(String, CellValue)>,
    pub percent_of_total: Option<String>,
    pub is_grand_total: bool,
}

impl SummaryRow {
    pub fn value(&self, label: &str) -> Option<&CellValue> {
        self.values.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    /// Value to place under an output column header; index 0 is the label.
    pub fn cell_for_column(&self, index: usize, header: &str) -> CellValue {
        if index == 0 {
            return CellValue::Text(self.group_label.clone());
        }
        if header == PERCENT_OF_TOTAL {
            return self
                .percent_of_total
                .clone()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty);
        }
        self.value(header).cloned().unwrap_or(CellValue::Empty)
    }
}
