//! FILENAME: app/cli/src/legacy.rs
// PURPOSE: Fixed worksheet layouts selected by worksheet name.
// CONTEXT: A `worksheets` entry given as a bare table name picks its layout
// here. Layouts are data: a select list, the summaries with their anchors,
// spacing, highlight columns and the filter switch.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use summary_engine::{AggregateFunction, AggregateSpec, GroupBy, SummarySpec};

use crate::templates::{state_pair, tat_summary, STANDARD_COLUMNS};
use crate::worksheet::WorksheetSpec;

/// Worksheet key reserved for the cross-sheet summary.
pub const SUMMARY_SHEET_KEY: &str = "Summary";

const COUNT: &str = "Count";
const COUNT_OF_POLICY: &str = "CountOfPolicy No";

const DENIAL_COLUMNS: [&str; 11] = [
    "Inq_Date",
    "Stat_Start_Date",
    "Decision",
    "Decision_Reason",
    "Company",
    "Issue_State",
    "Resident_State",
    "Product",
    "Date_of_Loss",
    "Schedule_ID",
    "TAT_in_Days",
];

struct LegacyLayout {
    select: Vec<&'static str>,
    spacing: &'static [&'static str],
    highlight: &'static [&'static str],
    filters: bool,
    summaries: fn() -> Vec<SummarySpec>,
}

impl LegacyLayout {
    fn detail(select: Vec<&'static str>) -> Self {
        LegacyLayout {
            select,
            spacing: &[],
            highlight: &[],
            filters: true,
            summaries: Vec::new,
        }
    }

    fn standard(summaries: fn() -> Vec<SummarySpec>) -> Self {
        LegacyLayout {
            spacing: &["H"],
            summaries,
            ..Self::detail(STANDARD_COLUMNS.to_vec())
        }
    }

    fn build(&self, name: &str, table: &str) -> WorksheetSpec {
        let query = format!(
            "SELECT {} FROM {} WHERE Schedule_ID = '{}'",
            self.select.join(", "),
            table,
            name
        );
        let mut spec = WorksheetSpec::new(name, query)
            .with_spacing(self.spacing)
            .with_highlight(self.highlight)
            .with_filters(self.filters);
        spec.summaries = (self.summaries)();
        spec
    }
}

fn standard_with(extra: &'static str) -> Vec<&'static str> {
    let mut columns = STANDARD_COLUMNS.to_vec();
    columns.push(extra);
    columns
}

fn state_counts() -> Vec<SummarySpec> {
    state_pair(COUNT, "I", "L")
}

fn state_policy_counts() -> Vec<SummarySpec> {
    state_pair(COUNT_OF_POLICY, "I", "L")
}

fn summary_only_states() -> Vec<SummarySpec> {
    state_pair(COUNT_OF_POLICY, "A", "D")
}

fn tat_at_j() -> Vec<SummarySpec> {
    vec![tat_summary("J")]
}

fn tat_at_m() -> Vec<SummarySpec> {
    vec![tat_summary("M")]
}

fn tat_and_states() -> Vec<SummarySpec> {
    let mut all = vec![tat_summary("J")];
    all.extend(state_pair(COUNT_OF_POLICY, "N", "Q"));
    all
}

fn company_counts() -> Vec<SummarySpec> {
    let company = |field: &str, header: &str, anchor: &str| {
        SummarySpec::new(GroupBy::parse(field), anchor, &[header, COUNT, "Company"])
            .with_aggregate(AggregateSpec::new(COUNT, AggregateFunction::Sum, COUNT))
            .with_aggregate(AggregateSpec::new("Company", AggregateFunction::Count, "Company"))
    };
    vec![
        company("Issue_State", "Issue State", "A"),
        company("Resident_State", "Resident State", "E"),
    ]
}

fn states_and_payreq_year() -> Vec<SummarySpec> {
    let mut all = state_pair(COUNT, "J", "M");
    all.push(
        SummarySpec::new(
            GroupBy::parse("Year_Pay_Req_Received"),
            "P",
            &["Year Pay Req Received", "Counts"],
        )
        .with_aggregate(AggregateSpec::new("Policy_Num", AggregateFunction::Count, "Counts")),
    );
    all
}

static LEGACY_LAYOUTS: Lazy<HashMap<&'static str, LegacyLayout>> = Lazy::new(|| {
    let mut layouts = HashMap::new();

    for name in ["1-001", "1-006"] {
        layouts.insert(
            name,
            LegacyLayout {
                filters: false,
                summaries: summary_only_states,
                ..LegacyLayout::detail(vec!["Policy_Num", "Issue_State", "Resident_State"])
            },
        );
    }

    layouts.insert(
        "1-004",
        LegacyLayout::detail(vec![
            "Policy",
            "Lapse_Da",
            "Stati",
            "Status_Reas",
            "Company",
            "Issue_St",
            "Resident_St",
        ]),
    );

    for name in ["2-001", "2-002", "2-004", "2-005", "6-002", "6-003"] {
        layouts.insert(name, LegacyLayout::standard(state_counts));
    }
    for name in ["5-001", "5-004"] {
        layouts.insert(name, LegacyLayout::standard(state_policy_counts));
    }

    layouts.insert(
        "2-003",
        LegacyLayout {
            spacing: &["I"],
            summaries: tat_at_j,
            ..LegacyLayout::detail(standard_with("TAT_in_Days"))
        },
    );

    layouts.insert(
        "3-001",
        LegacyLayout {
            spacing: &["L"],
            highlight: &["C", "D"],
            summaries: tat_at_m,
            ..LegacyLayout::detail(DENIAL_COLUMNS.to_vec())
        },
    );

    for name in ["3-003", "3-004", "3-005"] {
        let mut select = vec!["Decision_Date"];
        select.extend(DENIAL_COLUMNS);
        layouts.insert(
            name,
            LegacyLayout {
                highlight: &["D", "E"],
                ..LegacyLayout::detail(select)
            },
        );
    }

    layouts.insert(
        "3-006",
        LegacyLayout {
            highlight: &["C", "D"],
            ..LegacyLayout::detail(DENIAL_COLUMNS.to_vec())
        },
    );

    layouts.insert(
        "3-007",
        LegacyLayout {
            highlight: &["F", "G"],
            ..LegacyLayout::detail(vec![
                "Policy",
                "Claim_Number",
                "Decision_Date",
                "Inq_Date",
                "Stat_Start_Date",
                "Decision",
                "Decision_Reason",
                "Company",
                "Issue_State",
                "Resident_State",
                "Product",
                "Date_of_Loss",
                "Schedule_ID_2",
            ])
        },
    );

    for name in ["5-002", "6-001"] {
        layouts.insert(
            name,
            LegacyLayout {
                filters: false,
                summaries: company_counts,
                ..LegacyLayout::detail(vec!["Issue_State", "Resident_State", "Company", "Count"])
            },
        );
    }

    layouts.insert(
        "5-003",
        LegacyLayout {
            spacing: &["I"],
            summaries: tat_and_states,
            ..LegacyLayout::detail(standard_with("TAT_in_Days"))
        },
    );

    layouts.insert(
        "6-004",
        LegacyLayout {
            spacing: &["I"],
            summaries: states_and_payreq_year,
            ..LegacyLayout::detail(standard_with("Year_Pay_Req_Received"))
        },
    );

    layouts
});

/// Layout for a known worksheet name reading from `table`; `None` for unknown names.
pub fn legacy_worksheet(name: &str, table: &str) -> Option<WorksheetSpec> {
    LEGACY_LAYOUTS.get(name).map(|layout| layout.build(name, table))
}

/// Every worksheet name with a fixed layout, sorted.
pub fn legacy_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = LEGACY_LAYOUTS.keys().copied().collect();
    names.sort_unstable();
    names
}
