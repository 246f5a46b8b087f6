//! FILENAME: core/summary-engine/src/engine.rs
//! Summary Calculation Engine - Transforms query rows into summary rows.
//!
//! This module takes a SummarySpec (the configuration) and the rows of one
//! worksheet query and produces the grouped SummaryRows to be written.
//!
//! Algorithm:
//! 1. Partition rows into groups (field value or range bucket)
//! 2. Order groups (bucket order, otherwise ascending text)
//! 3. Compute each aggregate per group, accumulating the COUNT total
//! 4. Fill in "% of Total" from the first aggregate
//! 5. Append the grand-total row when requested
//!
//! Bad data degrades to a default value and a diagnostic; it never aborts.

use engine::{CellValue, Row};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::definition::{
    AggregateFunction, AggregateSpec, GroupBy, SummaryRow, SummarySpec, GRAND_TOTAL_LABEL,
};
use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::range::{classify, RangeBucket};
use crate::resolver::{resolve, resolve_key};

static DIGIT_RUN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"-?[0-9]*\.?[0-9]+").ok());

// ============================================================================
// NUMERIC COERCION
// ============================================================================

/// Lenient numeric reading: direct parse first, then the first digit run
/// found inside text (so `"5 days"` reads as 5).
pub fn coerce_number(value: &CellValue) -> Option<f64> {
    if let Some(n) = value.as_number() {
        return Some(n);
    }
    match value {
        CellValue::Text(s) => DIGIT_RUN
            .as_ref()?
            .find(s)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Percentage text with at most two decimals: `50.0%`, `66.67%`.
fn format_percent(percent: f64) -> String {
    let rounded = (percent * 100.0).round() / 100.0;
    format!("{:?}%", rounded)
}

// ============================================================================
// GROUPING
// ============================================================================

struct Group<'r> {
    label: String,
    rows: Vec<&'r Row>,
}

// ============================================================================
// CALCULATOR
// ============================================================================

/// Computes one summary table.
pub struct SummaryCalculator<'a> {
    spec: &'a SummarySpec,
    diagnostics: &'a dyn Diagnostics,
    include_grand_total: bool,
}

impl<'a> SummaryCalculator<'a> {
    /// Grand totals follow `SummarySpec::wants_grand_total`.
    pub fn new(spec: &'a SummarySpec, diagnostics: &'a dyn Diagnostics) -> Self {
        SummaryCalculator {
            spec,
            diagnostics,
            include_grand_total: spec.wants_grand_total(),
        }
    }

    pub fn with_grand_total(mut self, include: bool) -> Self {
        self.include_grand_total = include;
        self
    }

    pub fn calculate(&self, rows: &[Row]) -> Vec<SummaryRow> {
        self.report_unresolved_fields(rows);

        let groups = match &self.spec.group_by {
            GroupBy::RangeBucketed { field } => self.group_by_range(rows, field),
            GroupBy::Field(field) => self.group_by_field(rows, field),
        };

        let mut running_total = 0.0;
        let mut summary_rows: Vec<SummaryRow> = groups
            .iter()
            .map(|group| {
                let values = self
                    .spec
                    .aggregates
                    .iter()
                    .map(|agg| {
                        let value = self.compute_aggregate(agg, &group.rows);
                        if agg.function == AggregateFunction::Count {
                            if let CellValue::Number(n) = value {
                                running_total += n;
                            }
                        }
                        (agg.label.clone(), value)
                    })
                    .collect();
                SummaryRow {
                    group_label: group.label.clone(),
                    values,
                    percent_of_total: None,
                    is_grand_total: false,
                }
            })
            .collect();

        if self.spec.wants_percent_of_total() {
            for row in summary_rows.iter_mut() {
                let first = row.values.first().map(|(_, v)| v);
                row.percent_of_total = Some(match first {
                    Some(CellValue::Number(n)) if running_total > 0.0 => {
                        format_percent(n / running_total * 100.0)
                    }
                    _ => "0%".to_string(),
                });
            }
        }

        if self.include_grand_total && !summary_rows.is_empty() {
            let grand_total = self.grand_total_row(&summary_rows);
            summary_rows.push(grand_total);
        }

        summary_rows
    }

    /// One diagnostic per configured field that no row can resolve.
    fn report_unresolved_fields(&self, rows: &[Row]) {
        if rows.is_empty() {
            return;
        }
        let mut fields: Vec<&str> = vec![self.spec.group_by.field()];
        fields.extend(
            self.spec
                .aggregates
                .iter()
                .map(|a| a.field.as_str())
                .filter(|f| !f.trim().is_empty()),
        );

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for field in fields {
            if !seen.insert(field) {
                continue;
            }
            if rows.iter().all(|r| resolve_key(r, field).is_none()) {
                self.diagnostics.emit(DiagnosticEvent::FieldUnresolved {
                    field: field.to_string(),
                });
            }
        }
    }

    fn group_by_range<'r>(&self, rows: &'r [Row], field: &str) -> Vec<Group<'r>> {
        let mut buckets: FxHashMap<RangeBucket, Vec<&'r Row>> = FxHashMap::default();
        for row in rows {
            let value = resolve(row, field).cloned().unwrap_or(CellValue::Empty);
            match classify(&value) {
                Some(bucket) => buckets.entry(bucket).or_default().push(row),
                None => self.diagnostics.emit(DiagnosticEvent::RangeExcluded {
                    field: field.to_string(),
                    value: value.display_value(),
                }),
            }
        }

        RangeBucket::ALL
            .iter()
            .filter_map(|bucket| {
                buckets.remove(bucket).map(|rows| Group {
                    label: bucket.label().to_string(),
                    rows,
                })
            })
            .collect()
    }

    fn group_by_field<'r>(&self, rows: &'r [Row], field: &str) -> Vec<Group<'r>> {
        let mut groups: FxHashMap<String, Vec<&'r Row>> = FxHashMap::default();
        for row in rows {
            let key = resolve(row, field)
                .map(|v| v.display_value())
                .unwrap_or_default();
            groups.entry(key).or_default().push(row);
        }

        let mut groups: Vec<Group<'r>> = groups
            .into_iter()
            .map(|(label, rows)| Group { label, rows })
            .collect();
        groups.sort_by(|a, b| a.label.cmp(&b.label));
        groups
    }

    /// Computes the aggregate value for one group.
    fn compute_aggregate(&self, agg: &AggregateSpec, rows: &[&Row]) -> CellValue {
        let field = agg.field.as_str();
        let present: Vec<&CellValue> = rows
            .iter()
            .filter_map(|r| resolve(r, field))
            .filter(|v| !v.is_null())
            .collect();

        match agg.function {
            AggregateFunction::Count => {
                if field.trim().is_empty() {
                    return CellValue::Number(rows.len() as f64);
                }
                let distinct: FxHashSet<String> = present
                    .iter()
                    .filter(|v| !v.is_blank())
                    .map(|v| v.display_value())
                    .collect();
                CellValue::Number(distinct.len() as f64)
            }
            AggregateFunction::Sum => {
                let total = present
                    .iter()
                    .filter(|v| !v.is_blank())
                    .map(|v| match coerce_number(v) {
                        Some(n) => n,
                        None => {
                            self.diagnostics.emit(DiagnosticEvent::NonNumericValue {
                                field: field.to_string(),
                                value: v.display_value(),
                            });
                            0.0
                        }
                    })
                    .sum();
                CellValue::Number(total)
            }
            AggregateFunction::Avg => {
                let numbers: Vec<f64> = present.iter().filter_map(|v| coerce_number(v)).collect();
                if numbers.is_empty() {
                    CellValue::Number(0.0)
                } else {
                    CellValue::Number(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
            }
            AggregateFunction::Min => present
                .iter()
                .min_by(|a, b| a.compare(b))
                .copied()
                .cloned()
                .unwrap_or(CellValue::Empty),
            AggregateFunction::Max => present
                .iter()
                .max_by(|a, b| a.compare(b))
                .copied()
                .cloned()
                .unwrap_or(CellValue::Empty),
            AggregateFunction::First => present
                .iter()
                .find(|v| !v.is_blank())
                .copied()
                .cloned()
                .unwrap_or_else(|| CellValue::text("")),
        }
    }

    /// Sums every numeric aggregate; FIRST and wholly non-numeric labels are left out.
    fn grand_total_row(&self, rows: &[SummaryRow]) -> SummaryRow {
        let mut values = Vec::new();
        for agg in &self.spec.aggregates {
            if agg.function == AggregateFunction::First {
                continue;
            }
            let numbers: Vec<f64> = rows
                .iter()
                .filter_map(|r| match r.value(&agg.label) {
                    Some(CellValue::Number(n)) => Some(*n),
                    _ => None,
                })
                .collect();
            if !numbers.is_empty() {
                values.push((agg.label.clone(), CellValue::Number(numbers.iter().sum())));
            }
        }

        let label = if self.spec.group_by.is_range_bucketed() {
            String::new()
        } else {
            GRAND_TOTAL_LABEL.to_string()
        };

        SummaryRow {
            group_label: label,
            values,
            percent_of_total: self.spec.wants_percent_of_total().then(|| "100%".to_string()),
            is_grand_total: true,
        }
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Calculates a summary table from rows.
/// This is the main entry point for the aggregation engine.
pub fn aggregate(
    rows: &[Row],
    spec: &SummarySpec,
    include_grand_total: bool,
    diagnostics: &dyn Diagnostics,
) -> Vec<SummaryRow> {
    SummaryCalculator::new(spec, diagnostics)
        .with_grand_total(include_grand_total)
        .calculate(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::PERCENT_OF_TOTAL;
    use crate::diagnostics::RecordingDiagnostics;

    fn state_rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("Policy_Num", "P1"), ("Issue_State", "CA")]),
            Row::from_pairs([("Policy_Num", "P2"), ("Issue_State", "CA")]),
            Row::from_pairs([("Policy_Num", "P3"), ("Issue_State", "NY")]),
        ]
    }

    fn state_spec() -> SummarySpec {
        SummarySpec::new(GroupBy::parse("Issue_State"), "I", &["Issue State", "Count"])
            .with_aggregate(AggregateSpec::new("Policy_Num", AggregateFunction::Count, "Count"))
    }

    fn tat_spec() -> SummarySpec {
        SummarySpec::new(GroupBy::parse("TAT_Range"), "I", &["", "TAT COUNTS", PERCENT_OF_TOTAL])
            .with_aggregate(AggregateSpec::count_records("TAT COUNTS"))
    }

    fn tat_rows(days: &[CellValue]) -> Vec<Row> {
        days.iter()
            .map(|d| Row::from_pairs([("TAT_in_Days", d.clone())]))
            .collect()
    }

    #[test]
    fn test_state_count_with_grand_total() {
        let diag = RecordingDiagnostics::new();
        let result = aggregate(&state_rows(), &state_spec(), true, &diag);

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].group_label, "CA");
        assert_eq!(result[0].value("Count"), Some(&CellValue::Number(2.0)));
        assert_eq!(result[1].group_label, "NY");
        assert_eq!(result[1].value("Count"), Some(&CellValue::Number(1.0)));
        assert_eq!(result[2].group_label, GRAND_TOTAL_LABEL);
        assert!(result[2].is_grand_total);
        assert_eq!(result[2].value("Count"), Some(&CellValue::Number(3.0)));
        assert!(diag.events().is_empty());
    }

    #[test]
    fn test_count_is_distinct_non_blank() {
        let rows = vec![
            Row::from_pairs([("Policy_Num", "P1"), ("Issue_State", "CA")]),
            Row::from_pairs([("Policy_Num", "P1"), ("Issue_State", "CA")]),
            Row::from_pairs([("Policy_Num", ""), ("Issue_State", "CA")]),
            Row::from_pairs([("Policy_Num", CellValue::Empty), ("Issue_State", "CA".into())]),
        ];
        let result = aggregate(&rows, &state_spec(), false, &RecordingDiagnostics::new());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].value("Count"), Some(&CellValue::Number(1.0)));
    }

    #[test]
    fn test_missing_group_field_groups_under_empty_label() {
        let rows = vec![
            Row::from_pairs([("Policy_Num", "P1")]),
            Row::from_pairs([("Policy_Num", "P2")]),
        ];
        let diag = RecordingDiagnostics::new();
        let result = aggregate(&rows, &state_spec(), false, &diag);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].group_label, "");
        assert_eq!(result[0].value("Count"), Some(&CellValue::Number(2.0)));
        assert!(diag
            .events()
            .contains(&DiagnosticEvent::FieldUnresolved { field: "Issue_State".to_string() }));
    }

    #[test]
    fn test_tat_buckets() {
        let rows = tat_rows(&[
            CellValue::Number(5.0),
            CellValue::Number(30.0),
            CellValue::Number(45.0),
            CellValue::Number(91.0),
            CellValue::Empty,
            CellValue::text("n/a"),
        ]);
        let diag = RecordingDiagnostics::new();
        let result = SummaryCalculator::new(&tat_spec(), &diag).calculate(&rows);

        let labels: Vec<&str> = result.iter().map(|r| r.group_label.as_str()).collect();
        assert_eq!(labels, vec!["-1 to <31", ">30 and <61", ">90", ""]);
        assert_eq!(result[0].value("TAT COUNTS"), Some(&CellValue::Number(2.0)));
        assert_eq!(result[0].percent_of_total.as_deref(), Some("50.0%"));
        assert_eq!(result[1].percent_of_total.as_deref(), Some("25.0%"));
        assert_eq!(result[2].percent_of_total.as_deref(), Some("25.0%"));

        let total = &result[3];
        assert!(total.is_grand_total);
        assert_eq!(total.value("TAT COUNTS"), Some(&CellValue::Number(4.0)));
        assert_eq!(total.percent_of_total.as_deref(), Some("100%"));

        let excluded = diag
            .events()
            .iter()
            .filter(|e| matches!(e, DiagnosticEvent::RangeExcluded { .. }))
            .count();
        assert_eq!(excluded, 2);
    }

    #[test]
    fn test_range_groups_cover_every_classified_row_once() {
        let days: Vec<CellValue> = (-3..150).map(|n| CellValue::Number(n as f64)).collect();
        let rows = tat_rows(&days);
        let result = aggregate(&rows, &tat_spec(), false, &RecordingDiagnostics::new());
        let counted: f64 = result
            .iter()
            .filter_map(|r| match r.value("TAT COUNTS") {
                Some(CellValue::Number(n)) => Some(*n),
                _ => None,
            })
            .sum();
        // -3, -2 and -1 are excluded
        assert_eq!(counted, 150.0);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let rows = tat_rows(&[
            CellValue::Number(1.0),
            CellValue::Number(40.0),
            CellValue::Number(70.0),
        ]);
        let result = aggregate(&rows, &tat_spec(), false, &RecordingDiagnostics::new());
        let total: f64 = result
            .iter()
            .filter_map(|r| r.percent_of_total.as_deref())
            .filter_map(|p| p.trim_end_matches('%').parse::<f64>().ok())
            .sum();
        assert!((total - 100.0).abs() <= 0.01 * result.len() as f64);
        assert_eq!(result[0].percent_of_total.as_deref(), Some("33.33%"));
    }

    #[test]
    fn test_sum_coerces_text() {
        let rows = vec![
            Row::from_pairs([("Issue_State", CellValue::text("TX")), ("Count", CellValue::Number(10.0))]),
            Row::from_pairs([("Issue_State", CellValue::text("TX")), ("Count", CellValue::Number(15.0))]),
            Row::from_pairs([("Issue_State", CellValue::text("TX")), ("Count", CellValue::text("5"))]),
        ];
        let spec = SummarySpec::new(GroupBy::parse("Issue_State"), "A", &["Issue State", "Count"])
            .with_aggregate(AggregateSpec::new("Count", AggregateFunction::Sum, "Count"));
        let result = aggregate(&rows, &spec, false, &RecordingDiagnostics::new());
        assert_eq!(result[0].value("Count"), Some(&CellValue::Number(30.0)));
    }

    #[test]
    fn test_sum_non_numeric_counts_as_zero() {
        let rows = vec![
            Row::from_pairs([("Issue_State", CellValue::text("TX")), ("Count", CellValue::text("7 policies"))]),
            Row::from_pairs([("Issue_State", CellValue::text("TX")), ("Count", CellValue::text("none"))]),
        ];
        let spec = SummarySpec::new(GroupBy::parse("Issue_State"), "A", &["Issue State", "Count"])
            .with_aggregate(AggregateSpec::new("Count", AggregateFunction::Sum, "Count"));
        let diag = RecordingDiagnostics::new();
        let result = aggregate(&rows, &spec, false, &diag);
        assert_eq!(result[0].value("Count"), Some(&CellValue::Number(7.0)));
        assert_eq!(
            diag.events(),
            vec![DiagnosticEvent::NonNumericValue { field: "Count".to_string(), value: "none".to_string() }]
        );
    }

    #[test]
    fn test_avg_min_max_first() {
        let rows = vec![
            Row::from_pairs([("Company", CellValue::Empty), ("Amount", CellValue::Number(4.0))]),
            Row::from_pairs([("Company", CellValue::text("Acme")), ("Amount", CellValue::Number(10.0))]),
            Row::from_pairs([("Company", CellValue::text("Beta")), ("Amount", CellValue::text("x"))]),
        ];
        let spec = SummarySpec::new(GroupBy::parse("Region"), "A", &["Region", "Avg", "Min", "Max", "Company"])
            .with_aggregate(AggregateSpec::new("Amount", AggregateFunction::Avg, "Avg"))
            .with_aggregate(AggregateSpec::new("Amount", AggregateFunction::Min, "Min"))
            .with_aggregate(AggregateSpec::new("Amount", AggregateFunction::Max, "Max"))
            .with_aggregate(AggregateSpec::new("Company", AggregateFunction::First, "Company"));
        let result = aggregate(&rows, &spec, false, &RecordingDiagnostics::new());
        let row = &result[0];
        assert_eq!(row.value("Avg"), Some(&CellValue::Number(7.0)));
        assert_eq!(row.value("Min"), Some(&CellValue::Number(4.0)));
        assert_eq!(row.value("Max"), Some(&CellValue::text("x")));
        assert_eq!(row.value("Company"), Some(&CellValue::text("Acme")));
    }

    #[test]
    fn test_empty_aggregates_defaults() {
        let rows = vec![Row::from_pairs([("Region", "West")])];
        let spec = SummarySpec::new(GroupBy::parse("Region"), "A", &["Region", "Avg", "Min", "First"])
            .with_aggregate(AggregateSpec::new("Amount", AggregateFunction::Avg, "Avg"))
            .with_aggregate(AggregateSpec::new("Amount", AggregateFunction::Min, "Min"))
            .with_aggregate(AggregateSpec::new("Amount", AggregateFunction::First, "First"));
        let result = aggregate(&rows, &spec, false, &RecordingDiagnostics::new());
        assert_eq!(result[0].value("Avg"), Some(&CellValue::Number(0.0)));
        assert_eq!(result[0].value("Min"), Some(&CellValue::Empty));
        assert_eq!(result[0].value("First"), Some(&CellValue::text("")));
    }

    #[test]
    fn test_grand_total_skips_first_and_non_numeric() {
        let rows = vec![
            Row::from_pairs([("Issue_State", "CA"), ("Company", "Acme"), ("Count", "3")]),
            Row::from_pairs([("Issue_State", "NY"), ("Company", "Beta"), ("Count", "4")]),
        ];
        let spec = SummarySpec::new(GroupBy::parse("Issue_State"), "A", &["Issue State", "Count", "Company"])
            .with_aggregate(AggregateSpec::new("Count", AggregateFunction::Sum, "Count"))
            .with_aggregate(AggregateSpec::new("Company", AggregateFunction::First, "Company"));
        let result = aggregate(&rows, &spec, true, &RecordingDiagnostics::new());
        let total = result.last().unwrap();
        assert!(total.is_grand_total);
        assert_eq!(total.value("Count"), Some(&CellValue::Number(7.0)));
        assert_eq!(total.value("Company"), None);
    }

    #[test]
    fn test_no_rows_no_grand_total() {
        let result = aggregate(&[], &state_spec(), true, &RecordingDiagnostics::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_percent_zero_when_no_count() {
        let rows = vec![Row::from_pairs([("Issue_State", "CA"), ("Count", "3")])];
        let spec = SummarySpec::new(GroupBy::parse("Issue_State"), "A", &["State", "Count", PERCENT_OF_TOTAL])
            .with_aggregate(AggregateSpec::new("Count", AggregateFunction::Sum, "Count"));
        let result = aggregate(&rows, &spec, false, &RecordingDiagnostics::new());
        assert_eq!(result[0].percent_of_total.as_deref(), Some("0%"));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&CellValue::Number(2.5)), Some(2.5));
        assert_eq!(coerce_number(&CellValue::text("12")), Some(12.0));
        assert_eq!(coerce_number(&CellValue::text("about 3.5 days")), Some(3.5));
        assert_eq!(coerce_number(&CellValue::text("none")), None);
        assert_eq!(coerce_number(&CellValue::Empty), None);
        assert_eq!(format_percent(200.0 / 3.0), "66.67%");
        assert_eq!(format_percent(50.0), "50.0%");
    }
}
