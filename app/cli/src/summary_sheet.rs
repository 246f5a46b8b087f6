//! FILENAME: app/cli/src/summary_sheet.rs
// PURPOSE: Builds the "Summary" sheet from per-schedule key/value rows.
// CONTEXT: Rows are grouped by the schedule number in front of the first
// hyphen of their identifier ("2-001" -> 2). Layout, top to bottom:
//   row 2-4  line of business, reporting period, filing deadline
//   row 6    first group: title, header row (ID | | Description | | Value | Data Source), members
// Groups are separated by one blank row.

use engine::{
    BorderLineStyle, CellCoord, CellStyle, CellValue, Color, NumberFormat, Row, TextAlign,
    VerticalAlign,
};
use persistence::Sheet;
use std::collections::BTreeMap;
use summary_engine::{resolve, DiagnosticEvent, Diagnostics};

use crate::config::SummarySheetConfig;

pub const SUMMARY_SHEET_NAME: &str = "Summary";

/// 1-based row of the first group title.
pub const FIRST_GROUP_ROW: u32 = 6;

const FONT_FAMILY: &str = "Aptos Narrow";
const FONT_SIZE: u8 = 12;
const VALUE_FILL: Color = Color::new(0xFF, 0xFF, 0x00);

// 0-based columns
const ID_COL: u32 = 0;
const DESCRIPTION_COL: u32 = 2;
const VALUE_COL: u32 = 4;
const SOURCE_COL: u32 = 5;

const COLUMN_WIDTHS: [(u32, f64); 6] = [(0, 15.0), (1, 3.0), (2, 70.0), (3, 3.0), (4, 18.0), (5, 20.0)];
const HEADER_BLOCK_HEIGHT: f64 = 20.0;

/// One row of the summary source table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryEntry {
    pub identifier: String,
    pub description: String,
    pub value: CellValue,
}

/// Query for the summary source table.
pub fn summary_query(table_name: &str) -> String {
    format!(
        "SELECT Schedule_ID, Description, Value FROM {} ORDER BY Schedule_ID",
        table_name
    )
}

/// Built-in title for a schedule number.
pub fn default_schedule_title(schedule: u32) -> String {
    match schedule {
        1 => "Schedule 1 - General Information".to_string(),
        2 => "Schedule 2 - Claimants".to_string(),
        3 => "Schedule 3 - Claimant Requests Denied/Not Paid".to_string(),
        n => format!("Schedule {}", n),
    }
}

fn schedule_title(schedule: u32, config: &SummarySheetConfig) -> String {
    config
        .schedule_titles
        .get(&schedule)
        .cloned()
        .unwrap_or_else(|| default_schedule_title(schedule))
}

// ============================================================================
// GROUPING
// ============================================================================

fn entry_from_row(row: &Row) -> SummaryEntry {
    let text = |name: &str| resolve(row, name).map(|v| v.display_value()).unwrap_or_default();
    SummaryEntry {
        identifier: text("Schedule_ID"),
        description: text("Description"),
        value: resolve(row, "Value").cloned().unwrap_or(CellValue::Empty),
    }
}

/// Schedule number of an identifier; `None` when it has no numeric prefix.
pub fn schedule_number(identifier: &str) -> Option<u32> {
    identifier.split('-').next()?.trim().parse().ok()
}

/// Groups entries by schedule number (ascending), members sorted by identifier.
pub fn group_entries(rows: &[Row], diagnostics: &dyn Diagnostics) -> BTreeMap<u32, Vec<SummaryEntry>> {
    let mut groups: BTreeMap<u32, Vec<SummaryEntry>> = BTreeMap::new();

    for entry in rows.iter().map(entry_from_row) {
        let number = match schedule_number(&entry.identifier) {
            Some(n) => n,
            None => {
                diagnostics.emit(DiagnosticEvent::UnparseableIdentifier {
                    identifier: entry.identifier.clone(),
                });
                0
            }
        };
        groups.entry(number).or_default().push(entry);
    }

    for members in groups.values_mut() {
        members.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    }
    groups
}

// ============================================================================
// WRITING
// ============================================================================

fn base_style() -> CellStyle {
    CellStyle::new()
        .with_font(FONT_FAMILY, FONT_SIZE)
        .with_text_align(TextAlign::Left)
        .with_vertical_align(VerticalAlign::Top)
}

/// Numbers get thousands separators; text that reads as a number is written as one.
fn value_cell(value: &CellValue) -> (CellValue, NumberFormat) {
    let number = match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => s.trim().replace(',', "").parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    };
    match number {
        Some(n) => {
            let decimal_places = if n.fract() == 0.0 { 0 } else { 2 };
            (
                CellValue::Number(n),
                NumberFormat::Number {
                    decimal_places,
                    use_thousands_separator: true,
                },
            )
        }
        None => (value.clone(), NumberFormat::General),
    }
}

/// Writes the whole Summary sheet. Returns the 1-based title row of each group.
pub fn write_summary_sheet(
    sheet: &mut Sheet,
    rows: &[Row],
    config: &SummarySheetConfig,
    reporting_period: &str,
    diagnostics: &dyn Diagnostics,
) -> Vec<(u32, u32)> {
    let base = base_style();
    let bold = base.clone().with_bold(true);
    let highlighted = bold.clone().with_background(VALUE_FILL);

    sheet.write_cell(
        (1, 0),
        CellValue::Text(format!("Line of Business: {}", config.line_of_business)),
        &bold,
    );
    sheet.write_cell(
        (2, 0),
        CellValue::Text(format!("Reporting Period: {}", reporting_period)),
        &highlighted,
    );
    sheet.write_cell(
        (3, 0),
        CellValue::Text(format!("Filing Deadline: {}", config.filing_deadline)),
        &highlighted,
    );

    let header = bold.clone().with_border(BorderLineStyle::Thin);
    let header_right = header.clone().with_text_align(TextAlign::Right);
    let member = base.clone().with_border(BorderLineStyle::Thin);
    let description = member.clone().with_wrap_text(true);
    let value_style = member
        .clone()
        .with_text_align(TextAlign::Right)
        .with_background(VALUE_FILL);

    let mut title_rows = Vec::new();
    let mut current: u32 = FIRST_GROUP_ROW - 1;

    for (schedule, members) in group_entries(rows, diagnostics) {
        title_rows.push((schedule, current + 1));
        sheet.write_cell((current, ID_COL), CellValue::Text(schedule_title(schedule, config)), &bold);

        let header_row = current + 1;
        let at = |col: u32| -> CellCoord { (header_row, col) };
        sheet.write_cell(at(ID_COL), CellValue::text("ID"), &header);
        sheet.write_cell(at(DESCRIPTION_COL), CellValue::text("Description"), &header);
        sheet.write_cell(at(VALUE_COL), CellValue::text("Value"), &header_right);
        sheet.write_cell(at(SOURCE_COL), CellValue::text("Data Source"), &header);

        for (offset, entry) in members.iter().enumerate() {
            let row = header_row + 1 + offset as u32;
            sheet.write_cell((row, ID_COL), CellValue::Text(entry.identifier.clone()), &member);
            sheet.write_cell(
                (row, DESCRIPTION_COL),
                CellValue::Text(entry.description.clone()),
                &description,
            );
            let (value, format) = value_cell(&entry.value);
            sheet.write_cell((row, VALUE_COL), value, &value_style.clone().with_number_format(format));
            sheet.write_cell((row, SOURCE_COL), CellValue::Text(config.data_source.clone()), &member);
        }

        // title, header, members, one blank row
        current += 2 + members.len() as u32 + 1;
    }

    for (col, width) in COLUMN_WIDTHS {
        sheet.set_column_width(col, width);
    }
    for row in 1..=3 {
        sheet.set_row_height(row, HEADER_BLOCK_HEIGHT);
    }

    title_rows
}
