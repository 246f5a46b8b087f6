//! FILENAME: app/cli/src/templates.rs
// PURPOSE: Expands a template worksheet entry into a WorksheetSpec.
// CONTEXT: Each template fixes a select list and a summary set. Summary
// tables are placed left to right after the detail table with one blank
// column between neighbouring tables.

use engine::{index_to_letter, letter_to_index};
use serde::Deserialize;
use std::str::FromStr;
use summary_engine::{
    AggregateFunction, AggregateSpec, GroupBy, SummarySpec, DEFAULT_RANGE_FIELD, PERCENT_OF_TOTAL,
};

use crate::config::validate_table_name;
use crate::error::ConfigError;
use crate::worksheet::{WorksheetSpec, DEFAULT_HEADER_ROW};

/// Select list shared by most claim schedules.
pub const STANDARD_COLUMNS: [&str; 7] = [
    "Policy_Num",
    "Claim_Num",
    "Product",
    "Claim_Status",
    "Company",
    "Issue_State",
    "Resident_State",
];

// ============================================================================
// CONFIG ENTRY
// ============================================================================

/// Object form of a `worksheets` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateEntry {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    /// Replaces the generated query entirely.
    #[serde(default)]
    pub query: Option<String>,
    /// Detail display headers.
    #[serde(default)]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub currency_columns: Vec<String>,
    /// Extra condition appended as `AND ({filter})`.
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub highlight_columns: Vec<String>,
    #[serde(default)]
    pub header_row: Option<u32>,
    #[serde(default)]
    pub filters: Option<bool>,
}

// ============================================================================
// TEMPLATES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    DirectDump,
    DirectDumpStateSummary,
    DirectDumpTatSummary,
    DirectDumpStateTatSummary,
    StateSummaryOnly,
    StateSummaryWithCompany,
    DirectDumpStatePayreqSummary,
}

impl FromStr for Template {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct_dump" => Ok(Template::DirectDump),
            "direct_dump_state_summary" => Ok(Template::DirectDumpStateSummary),
            "direct_dump_tat_summary" => Ok(Template::DirectDumpTatSummary),
            "direct_dump_state_tat_summary" => Ok(Template::DirectDumpStateTatSummary),
            "state_summary_only" => Ok(Template::StateSummaryOnly),
            "state_summary_with_company" => Ok(Template::StateSummaryWithCompany),
            "direct_dump_state_payreq_summary" => Ok(Template::DirectDumpStatePayreqSummary),
            other => Err(other.to_string()),
        }
    }
}

impl Template {
    /// Columns of the generated query; `None` selects `*`.
    pub fn select_list(&self) -> Option<Vec<&'static str>> {
        let standard = STANDARD_COLUMNS.to_vec();
        match self {
            Template::DirectDump => None,
            Template::DirectDumpStateSummary => Some(standard),
            Template::DirectDumpTatSummary | Template::DirectDumpStateTatSummary => {
                Some([standard, vec![DEFAULT_RANGE_FIELD]].concat())
            }
            Template::StateSummaryOnly => Some(vec!["Policy_Num", "Issue_State", "Resident_State"]),
            Template::StateSummaryWithCompany => {
                Some(vec!["Issue_State", "Resident_State", "Company", "Count"])
            }
            Template::DirectDumpStatePayreqSummary => {
                Some([standard, vec!["Year_Pay_Req_Received"]].concat())
            }
        }
    }

    pub fn is_summary_only(&self) -> bool {
        matches!(self, Template::StateSummaryOnly | Template::StateSummaryWithCompany)
    }

    /// Summary tables in left-to-right order, anchors not yet assigned.
    fn summaries(&self) -> Vec<SummarySpec> {
        match self {
            Template::DirectDump => Vec::new(),
            Template::DirectDumpStateSummary | Template::StateSummaryOnly => {
                state_pair("Count", "A", "A")
            }
            Template::DirectDumpTatSummary => vec![tat_summary("A")],
            Template::DirectDumpStateTatSummary => {
                let mut all = vec![tat_summary("A")];
                all.extend(state_pair("Count", "A", "A"));
                all
            }
            Template::StateSummaryWithCompany => vec![
                company_summary("Issue_State", "Issue State", "A"),
                company_summary("Resident_State", "Resident State", "A"),
            ],
            Template::DirectDumpStatePayreqSummary => {
                let mut all = state_pair("Count", "A", "A");
                all.push(
                    SummarySpec::new(
                        GroupBy::parse("Year_Pay_Req_Received"),
                        "A",
                        &["Year Pay Req Received", "Counts"],
                    )
                    .with_aggregate(AggregateSpec::new("Policy_Num", AggregateFunction::Count, "Counts")),
                );
                all
            }
        }
    }
}

// ============================================================================
// SUMMARY BUILDERS (shared with the legacy table)
// ============================================================================

/// Per-state policy count.
pub(crate) fn state_count(field: &str, header: &str, anchor: &str, label: &str) -> SummarySpec {
    SummarySpec::new(GroupBy::parse(field), anchor, &[header, label])
        .with_aggregate(AggregateSpec::new("Policy_Num", AggregateFunction::Count, label))
}

/// Issue State and Resident State counts.
pub(crate) fn state_pair(label: &str, issue_anchor: &str, resident_anchor: &str) -> Vec<SummarySpec> {
    vec![
        state_count("Issue_State", "Issue State", issue_anchor, label),
        state_count("Resident_State", "Resident State", resident_anchor, label),
    ]
}

/// Turnaround-time buckets with record counts and percent of total.
pub(crate) fn tat_summary(anchor: &str) -> SummarySpec {
    SummarySpec::new(
        GroupBy::RangeBucketed {
            field: DEFAULT_RANGE_FIELD.to_string(),
        },
        anchor,
        &["", "TAT COUNTS", PERCENT_OF_TOTAL],
    )
    .with_aggregate(AggregateSpec::count_records("TAT COUNTS"))
}

fn company_summary(field: &str, header: &str, anchor: &str) -> SummarySpec {
    SummarySpec::new(GroupBy::parse(field), anchor, &[header, "Count", "Company"])
        .with_aggregate(AggregateSpec::new("Count", AggregateFunction::Sum, "Count"))
        .with_aggregate(AggregateSpec::new("Company", AggregateFunction::First, "Company"))
}

// ============================================================================
// EXPANSION
// ============================================================================

/// Builds the worksheet `name` from its template entry.
pub fn expand(name: &str, entry: &TemplateEntry) -> Result<WorksheetSpec, ConfigError> {
    let template_name = entry.template.as_deref().unwrap_or("direct_dump");
    let template: Template = template_name.parse().map_err(|_| ConfigError::UnknownTemplate {
        sheet: name.to_string(),
        template: template_name.to_string(),
    })?;

    let select_list = template.select_list();
    let query = match &entry.query {
        Some(custom) => custom.clone(),
        None => default_query(name, entry, select_list.as_deref())?,
    };

    let mut spec = WorksheetSpec::new(name, query);
    spec.header_row = entry.header_row.unwrap_or(DEFAULT_HEADER_ROW);
    spec.currency_columns = entry.currency_columns.clone();
    spec.highlighted_columns = entry.highlight_columns.clone();
    spec.filters_enabled = entry.filters.unwrap_or(!template.is_summary_only());

    if template.is_summary_only() {
        if entry.columns.is_some() {
            log::warn!(target: "CONFIG", "Worksheet '{}': columns ignored for summary-only template", name);
        }
    } else {
        spec.detail_columns = entry.columns.clone();
    }

    let mut summaries = template.summaries();
    if summaries.is_empty() {
        spec.summaries = summaries;
        return Ok(spec);
    }

    // 1-based column where the next table starts
    let mut next_column = if template.is_summary_only() {
        1
    } else {
        let detail_start = letter_to_index(&spec.detail_anchor_column).map_err(|source| {
            ConfigError::InvalidColumn {
                sheet: name.to_string(),
                source,
            }
        })?;
        let detail_width = match (&spec.detail_columns, &select_list) {
            (Some(columns), _) => columns.len(),
            (None, Some(select)) => select.len(),
            (None, None) => 0,
        };
        let gap = detail_start + detail_width as u32;
        spec.spacing_columns = vec![index_to_letter(gap)];
        gap + 1
    };

    for summary in summaries.iter_mut() {
        summary.anchor_column = index_to_letter(next_column);
        next_column += summary.width() as u32 + 1;
    }
    spec.summaries = summaries;

    Ok(spec)
}

fn default_query(
    name: &str,
    entry: &TemplateEntry,
    select_list: Option<&[&str]>,
) -> Result<String, ConfigError> {
    let table = entry.table.as_deref().ok_or_else(|| ConfigError::InvalidWorksheet {
        sheet: name.to_string(),
        message: "either 'table' or 'query' is required".to_string(),
    })?;
    validate_table_name(table)?;

    let columns = select_list.map_or_else(|| "*".to_string(), |cols| cols.join(", "));
    let mut query = format!(
        "SELECT {} FROM {} WHERE Schedule_ID = '{}'",
        columns,
        table,
        name.replace('\'', "''")
    );
    if let Some(filter) = entry.filter.as_deref().filter(|f| !f.trim().is_empty()) {
        query.push_str(&format!(" AND ({})", filter));
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(template: &str) -> TemplateEntry {
        TemplateEntry {
            table: Some("CLAIMS".to_string()),
            template: Some(template.to_string()),
            ..Default::default()
        }
    }

    fn anchors(spec: &WorksheetSpec) -> Vec<&str> {
        spec.summaries.iter().map(|s| s.anchor_column.as_str()).collect()
    }

    #[test]
    fn test_direct_dump_selects_everything() {
        let spec = expand("2-001", &entry("direct_dump")).unwrap();
        assert_eq!(spec.query, "SELECT * FROM CLAIMS WHERE Schedule_ID = '2-001'");
        assert!(spec.summaries.is_empty());
        assert!(spec.filters_enabled);
        assert!(!spec.is_summary_only());
    }

    #[test]
    fn test_missing_template_defaults_to_direct_dump() {
        let e = TemplateEntry {
            table: Some("CLAIMS".to_string()),
            ..Default::default()
        };
        let spec = expand("2-001", &e).unwrap();
        assert!(spec.query.starts_with("SELECT * FROM CLAIMS"));
    }

    #[test]
    fn test_state_summary_placed_after_detail() {
        let spec = expand("2-001", &entry("direct_dump_state_summary")).unwrap();
        assert_eq!(
            spec.query,
            "SELECT Policy_Num, Claim_Num, Product, Claim_Status, Company, Issue_State, Resident_State \
             FROM CLAIMS WHERE Schedule_ID = '2-001'"
        );
        assert_eq!(spec.spacing_columns, vec!["H"]);
        assert_eq!(anchors(&spec), vec!["I", "L"]);
        assert_eq!(spec.summaries[0].output_columns, vec!["Issue State", "Count"]);
    }

    #[test]
    fn test_state_tat_layout() {
        let spec = expand("5-003", &entry("direct_dump_state_tat_summary")).unwrap();
        assert_eq!(spec.spacing_columns, vec!["I"]);
        assert_eq!(anchors(&spec), vec!["J", "N", "Q"]);
        assert!(spec.summaries[0].group_by.is_range_bucketed());
        assert!(spec.summaries[0].wants_percent_of_total());
    }

    #[test]
    fn test_payreq_layout() {
        let spec = expand("6-004", &entry("direct_dump_state_payreq_summary")).unwrap();
        assert_eq!(anchors(&spec), vec!["J", "M", "P"]);
        assert_eq!(spec.summaries[2].output_columns, vec!["Year Pay Req Received", "Counts"]);
    }

    #[test]
    fn test_summary_only_templates_start_at_a() {
        let spec = expand("1-001", &entry("state_summary_only")).unwrap();
        assert!(spec.is_summary_only());
        assert!(!spec.filters_enabled);
        assert_eq!(anchors(&spec), vec!["A", "D"]);

        let company = expand("5-002", &entry("state_summary_with_company")).unwrap();
        assert_eq!(anchors(&company), vec!["A", "E"]);
        assert_eq!(company.summaries[0].aggregates[1].function, AggregateFunction::First);
    }

    #[test]
    fn test_columns_override_moves_summaries() {
        let mut e = entry("direct_dump_state_summary");
        e.columns = Some(vec!["Policy No".to_string(), "Claim No".to_string()]);
        let spec = expand("2-001", &e).unwrap();
        assert_eq!(spec.spacing_columns, vec!["C"]);
        assert_eq!(anchors(&spec), vec!["D", "G"]);
    }

    #[test]
    fn test_filter_and_custom_query() {
        let mut e = entry("direct_dump");
        e.filter = Some("Company = 'Acme'".to_string());
        let spec = expand("2-001", &e).unwrap();
        assert!(spec.query.ends_with("AND (Company = 'Acme')"));

        e.query = Some("SELECT 1 AS One".to_string());
        assert_eq!(expand("2-001", &e).unwrap().query, "SELECT 1 AS One");
    }

    #[test]
    fn test_unknown_template_is_config_error() {
        let err = expand("2-001", &entry("pivot_everything")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTemplate { .. }));
    }

    #[test]
    fn test_bad_table_name_rejected() {
        let mut e = entry("direct_dump");
        e.table = Some("CLAIMS; DROP TABLE X".to_string());
        assert!(matches!(expand("2-001", &e), Err(ConfigError::InvalidTableName(_))));
    }
}
