//! FILENAME: app/cli/src/worksheet.rs
// PURPOSE: Fully expanded description of one report worksheet.
// CONTEXT: Built either from a template entry or from the legacy layout table.
// Tables on one sheet are placed by column anchor only; keeping them apart is
// up to whoever assembles the worksheet.

use engine::letter_to_index;
use persistence::MAX_SHEET_NAME_LEN;
use summary_engine::SummarySpec;

use crate::error::ConfigError;

/// Header row used when a worksheet does not configure one.
pub const DEFAULT_HEADER_ROW: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetSpec {
    pub name: String,
    pub query: String,
    /// Column letter of the detail table's first header cell.
    pub detail_anchor_column: String,
    /// Display headers; `None` uses the query's own field names.
    pub detail_columns: Option<Vec<String>>,
    /// Blank separator columns between the detail table and the summaries.
    pub spacing_columns: Vec<String>,
    pub summaries: Vec<SummarySpec>,
    /// 1-based row shared by every table header on the sheet.
    pub header_row: u32,
    pub filters_enabled: bool,
    /// Sheet column letters whose detail cells get the highlight fill.
    pub highlighted_columns: Vec<String>,
    /// Field names rendered with the currency format.
    pub currency_columns: Vec<String>,
}

impl WorksheetSpec {
    pub fn new(name: &str, query: String) -> Self {
        WorksheetSpec {
            name: name.to_string(),
            query,
            detail_anchor_column: "A".to_string(),
            detail_columns: None,
            spacing_columns: Vec::new(),
            summaries: Vec::new(),
            header_row: DEFAULT_HEADER_ROW,
            filters_enabled: true,
            highlighted_columns: Vec::new(),
            currency_columns: Vec::new(),
        }
    }

    pub fn with_detail_columns(mut self, columns: &[&str]) -> Self {
        self.detail_columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn with_spacing(mut self, columns: &[&str]) -> Self {
        self.spacing_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_summary(mut self, summary: SummarySpec) -> Self {
        self.summaries.push(summary);
        self
    }

    pub fn with_filters(mut self, enabled: bool) -> Self {
        self.filters_enabled = enabled;
        self
    }

    pub fn with_highlight(mut self, columns: &[&str]) -> Self {
        self.highlighted_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Summaries present but no spacing or detail columns: the detail table is skipped.
    pub fn is_summary_only(&self) -> bool {
        let no_detail_columns = self.detail_columns.as_ref().map_or(true, |c| c.is_empty());
        !self.summaries.is_empty() && self.spacing_columns.is_empty() && no_detail_columns
    }

    pub fn is_highlighted(&self, column_letter: &str) -> bool {
        self.highlighted_columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(column_letter))
    }

    /// Rejects specs the composer could not lay out.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() || self.name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(self.invalid(format!(
                "sheet name must be 1 to {} characters",
                MAX_SHEET_NAME_LEN
            )));
        }
        if self.header_row < 1 {
            return Err(self.invalid("header_row must be at least 1".to_string()));
        }

        let letters = std::iter::once(&self.detail_anchor_column)
            .chain(self.spacing_columns.iter())
            .chain(self.highlighted_columns.iter())
            .chain(self.summaries.iter().map(|s| &s.anchor_column));
        for letter in letters {
            letter_to_index(letter).map_err(|source| ConfigError::InvalidColumn {
                sheet: self.name.clone(),
                source,
            })?;
        }

        for summary in &self.summaries {
            if summary.output_columns.is_empty() {
                return Err(self.invalid(format!(
                    "summary at column {} has no output columns",
                    summary.anchor_column
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> ConfigError {
        ConfigError::InvalidWorksheet {
            sheet: self.name.clone(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use summary_engine::{AggregateFunction, AggregateSpec, GroupBy};

    fn state_summary(anchor: &str) -> SummarySpec {
        SummarySpec::new(GroupBy::parse("Issue_State"), anchor, &["Issue State", "Count"])
            .with_aggregate(AggregateSpec::new("Policy_Num", AggregateFunction::Count, "Count"))
    }

    #[test]
    fn test_summary_only_detection() {
        let spec = WorksheetSpec::new("1-001", "SELECT 1".to_string()).with_summary(state_summary("A"));
        assert!(spec.is_summary_only());

        let with_spacing = spec.clone().with_spacing(&["H"]);
        assert!(!with_spacing.is_summary_only());

        let with_columns = spec.with_detail_columns(&["Policy No"]);
        assert!(!with_columns.is_summary_only());

        let detail_only = WorksheetSpec::new("2-001", "SELECT 1".to_string());
        assert!(!detail_only.is_summary_only());
    }

    #[test]
    fn test_highlight_is_case_insensitive() {
        let spec = WorksheetSpec::new("3-001", String::new()).with_highlight(&["C", "D"]);
        assert!(spec.is_highlighted("c"));
        assert!(!spec.is_highlighted("E"));
    }

    #[test]
    fn test_validate_rejects_bad_anchor() {
        let spec = WorksheetSpec::new("2-001", String::new()).with_summary(state_summary("1A"));
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidColumn { .. })));
    }

    #[test]
    fn test_validate_rejects_header_row_zero() {
        let mut spec = WorksheetSpec::new("2-001", String::new());
        spec.header_row = 0;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidWorksheet { .. })));
    }

    #[test]
    fn test_validate_accepts_standard_layout() {
        let spec = WorksheetSpec::new("2-001", String::new())
            .with_spacing(&["H"])
            .with_summary(state_summary("I"));
        assert!(spec.validate().is_ok());
    }
}
