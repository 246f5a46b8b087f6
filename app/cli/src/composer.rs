//! FILENAME: app/cli/src/composer.rs
// PURPOSE: Writes one worksheet: the detail table and its summary tables.
// CONTEXT: Every table shares the configured header row and differs only in
// its anchor column. Stages run in a fixed order and each is reported through
// the diagnostics sink:
//   FETCHED -> AGGREGATED -> DETAIL_WRITTEN -> SUMMARIES_WRITTEN -> AUTOSIZED
// DETAIL_WRITTEN is skipped for summary-only sheets.

use engine::{
    index_to_letter, plan_table, range_to_a1, BorderLineStyle, CellStyle, CellValue, Color, CoordError,
    NumberFormat, Row, TextAlign, VerticalAlign,
};
use persistence::Sheet;
use summary_engine::{
    map_columns, normalize_field_name, DiagnosticEvent, Diagnostics, SummaryCalculator, SummaryRow,
    SummarySpec,
};

use crate::worksheet::WorksheetSpec;

pub const STAGE_FETCHED: &str = "FETCHED";
pub const STAGE_AGGREGATED: &str = "AGGREGATED";
pub const STAGE_DETAIL_WRITTEN: &str = "DETAIL_WRITTEN";
pub const STAGE_SUMMARIES_WRITTEN: &str = "SUMMARIES_WRITTEN";
pub const STAGE_AUTOSIZED: &str = "AUTOSIZED";

/// Characters added to the longest text of a column.
pub const AUTOSIZE_PADDING: f64 = 2.0;
/// Widest an auto-sized column gets.
pub const AUTOSIZE_MAX_WIDTH: f64 = 50.0;

const HEADER_FILL: Color = Color::new(0xFF, 0xD9, 0x66);
const HIGHLIGHT_FILL: Color = Color::new(0xFF, 0xFF, 0x00);
const CURRENCY_SYMBOL: &str = "$";

// ============================================================================
// STYLES
// ============================================================================

fn header_style() -> CellStyle {
    CellStyle::new()
        .with_bold(true)
        .with_text_align(TextAlign::Center)
        .with_vertical_align(VerticalAlign::Middle)
        .with_background(HEADER_FILL)
        .with_border(BorderLineStyle::Thin)
}

fn data_style() -> CellStyle {
    CellStyle::new()
        .with_vertical_align(VerticalAlign::Top)
        .with_border(BorderLineStyle::Thin)
}

fn currency_format() -> NumberFormat {
    NumberFormat::Currency {
        decimal_places: 2,
        symbol: CURRENCY_SYMBOL.to_string(),
    }
}

fn summary_style(column_index: usize, is_grand_total: bool) -> CellStyle {
    let align = if column_index == 0 {
        TextAlign::Left
    } else {
        TextAlign::Right
    };
    data_style().with_text_align(align).with_bold(is_grand_total)
}

// ============================================================================
// PHASES
// ============================================================================

/// Computes every summary table of a worksheet, in spec order.
pub fn aggregate_worksheet(
    spec: &WorksheetSpec,
    rows: &[Row],
    diagnostics: &dyn Diagnostics,
) -> Vec<Vec<SummaryRow>> {
    let tables = spec
        .summaries
        .iter()
        .map(|summary| SummaryCalculator::new(summary, diagnostics).calculate(rows))
        .collect();
    stage(diagnostics, spec, STAGE_AGGREGATED);
    tables
}

/// Writes the detail table, the summary tables, column widths and the auto-filter.
pub fn compose_worksheet(
    sheet: &mut Sheet,
    spec: &WorksheetSpec,
    rows: &[Row],
    summaries: &[Vec<SummaryRow>],
    diagnostics: &dyn Diagnostics,
) -> Result<(), CoordError> {
    if !spec.is_summary_only() {
        write_detail_table(sheet, spec, rows)?;
        stage(diagnostics, spec, STAGE_DETAIL_WRITTEN);
    }

    for (summary, table) in spec.summaries.iter().zip(summaries) {
        write_summary_table(sheet, summary, table, spec.header_row)?;
    }
    stage(diagnostics, spec, STAGE_SUMMARIES_WRITTEN);

    sheet.autofit_columns(AUTOSIZE_PADDING, AUTOSIZE_MAX_WIDTH);
    stage(diagnostics, spec, STAGE_AUTOSIZED);
    Ok(())
}

pub(crate) fn stage(diagnostics: &dyn Diagnostics, spec: &WorksheetSpec, stage: &'static str) {
    diagnostics.emit(DiagnosticEvent::Stage {
        sheet: spec.name.clone(),
        stage,
    });
}

// ============================================================================
// DETAIL TABLE
// ============================================================================

/// Writes rows under their display headers. No rows, no table.
fn write_detail_table(sheet: &mut Sheet, spec: &WorksheetSpec, rows: &[Row]) -> Result<(), CoordError> {
    if rows.is_empty() {
        return Ok(());
    }

    let mappings = map_columns(spec.detail_columns.as_deref(), rows.first());
    let plan = plan_table(&spec.detail_anchor_column, spec.header_row, mappings.len(), rows.len())?;

    let header = header_style();
    for (mapping, &coord) in mappings.iter().zip(&plan.header_cells) {
        sheet.write_cell(coord, CellValue::text(mapping.display.as_str()), &header);
    }

    // Style per column: highlight by sheet letter, currency by field name.
    let currency: Vec<String> = spec
        .currency_columns
        .iter()
        .map(|c| normalize_field_name(c))
        .collect();
    let column_styles: Vec<CellStyle> = mappings
        .iter()
        .zip(&plan.header_cells)
        .map(|(mapping, &(_, col))| {
            let mut style = data_style();
            if spec.is_highlighted(&index_to_letter(col + 1)) {
                style = style.with_background(HIGHLIGHT_FILL);
            }
            let is_currency = currency.contains(&normalize_field_name(&mapping.field))
                || currency.contains(&normalize_field_name(&mapping.display));
            if is_currency {
                style = style.with_number_format(currency_format());
            }
            style
        })
        .collect();

    for (row, cells) in rows.iter().zip(&plan.data_cells) {
        for ((mapping, &coord), style) in mappings.iter().zip(cells).zip(&column_styles) {
            let value = row.get(&mapping.field).cloned().unwrap_or(CellValue::Empty);
            sheet.write_cell(coord, value, style);
        }
    }

    if spec.filters_enabled {
        if let (Some(first), Some(last)) = (plan.anchor(), plan.last_cell()) {
            log::debug!(target: "COMPOSER", "[{}] auto-filter {}", spec.name, range_to_a1(first, last));
            sheet.set_autofilter(first, last);
        }
    }
    Ok(())
}

// ============================================================================
// SUMMARY TABLES
// ============================================================================

/// Writes one summary table; a table with no rows is left out.
fn write_summary_table(
    sheet: &mut Sheet,
    summary: &SummarySpec,
    table: &[SummaryRow],
    header_row: u32,
) -> Result<(), CoordError> {
    if table.is_empty() {
        return Ok(());
    }

    let plan = plan_table(&summary.anchor_column, header_row, summary.width(), table.len())?;

    let header = header_style();
    for (title, &coord) in summary.output_columns.iter().zip(&plan.header_cells) {
        sheet.write_cell(coord, CellValue::text(title.as_str()), &header);
    }

    for (summary_row, cells) in table.iter().zip(&plan.data_cells) {
        for (index, (title, &coord)) in summary.output_columns.iter().zip(cells).enumerate() {
            let value = summary_row.cell_for_column(index, title);
            sheet.write_cell(coord, value, &summary_style(index, summary_row.is_grand_total));
        }
    }
    Ok(())
}
