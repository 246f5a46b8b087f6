//! FILENAME: core/persistence/src/xlsx_writer.rs

use crate::{PersistenceError, Sheet, Workbook};
use chrono::NaiveDate;
use engine::cell::CellValue;
use engine::style::{BorderLineStyle, CellStyle, Color, NumberFormat, TextAlign, VerticalAlign};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook as XlsxWorkbook, Worksheet};
use std::path::Path;

/// Format applied to dates when the cell style has no number format of its own.
const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";

pub fn save_xlsx(workbook: &Workbook, path: &Path) -> Result<(), PersistenceError> {
    let mut xlsx = XlsxWorkbook::new();

    for sheet in &workbook.sheets {
        let worksheet = xlsx.add_worksheet();
        write_sheet(worksheet, sheet)?;
    }

    xlsx.save(path)?;
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<(), PersistenceError> {
    worksheet.set_name(&sheet.name)?;

    for (col, width) in &sheet.column_widths {
        worksheet.set_column_width(*col as u16, *width)?;
    }

    for (row, height) in &sheet.row_heights {
        worksheet.set_row_height(*row, *height)?;
    }

    for ((row, col), cell) in sheet.grid.sorted_cells() {
        let col = col as u16;
        let style = sheet.styles.get(cell.style_index);
        let format = if cell.style_index > 0 {
            Some(convert_style_to_format(style))
        } else {
            None
        };

        match &cell.value {
            CellValue::Empty => {
                if let Some(fmt) = format {
                    worksheet.write_blank(row, col, &fmt)?;
                }
            }
            CellValue::Number(n) => {
                if let Some(fmt) = format {
                    worksheet.write_number_with_format(row, col, *n, &fmt)?;
                } else {
                    worksheet.write_number(row, col, *n)?;
                }
            }
            CellValue::Text(s) => {
                if let Some(fmt) = format {
                    worksheet.write_string_with_format(row, col, s, &fmt)?;
                } else {
                    worksheet.write_string(row, col, s)?;
                }
            }
            CellValue::Boolean(b) => {
                if let Some(fmt) = format {
                    worksheet.write_boolean_with_format(row, col, *b, &fmt)?;
                } else {
                    worksheet.write_boolean(row, col, *b)?;
                }
            }
            CellValue::Date(d) => {
                // Dates are serial numbers; an unformatted serial would read as a plain number
                let mut fmt = format.unwrap_or_default();
                if style.number_format == NumberFormat::General {
                    fmt = fmt.set_num_format(DEFAULT_DATE_FORMAT);
                }
                worksheet.write_number_with_format(row, col, excel_serial(d), &fmt)?;
            }
        }
    }

    if let Some(((first_row, first_col), (last_row, last_col))) = sheet.autofilter {
        worksheet.autofilter(first_row, first_col as u16, last_row, last_col as u16)?;
    }

    Ok(())
}

/// Days since the 1900 date system epoch (1899-12-30 absorbs Excel's 1900 leap-year bug).
fn excel_serial(date: &NaiveDate) -> f64 {
    match NaiveDate::from_ymd_opt(1899, 12, 30) {
        Some(epoch) => (*date - epoch).num_days() as f64,
        None => 0.0,
    }
}

fn convert_style_to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();

    // Font settings
    if style.font.bold {
        format = format.set_bold();
    }
    format = format.set_font_size(style.font.size as f64);
    format = format.set_font_name(&style.font.family);

    // Colors
    if style.font.color != Color::black() {
        format = format.set_font_color(color_to_xlsx(&style.font.color));
    }
    if let Some(background) = &style.background {
        format = format.set_background_color(color_to_xlsx(background));
    }

    // Horizontal alignment
    format = format.set_align(match style.text_align {
        TextAlign::Left => FormatAlign::Left,
        TextAlign::Center => FormatAlign::Center,
        TextAlign::Right => FormatAlign::Right,
        TextAlign::General => FormatAlign::General,
    });

    // Vertical alignment
    format = format.set_align(match style.vertical_align {
        VerticalAlign::Top => FormatAlign::Top,
        VerticalAlign::Middle => FormatAlign::VerticalCenter,
        VerticalAlign::Bottom => FormatAlign::Bottom,
    });

    // Borders on all four edges
    match style.border {
        BorderLineStyle::None => {}
        BorderLineStyle::Thin => format = format.set_border(FormatBorder::Thin),
        BorderLineStyle::Medium => format = format.set_border(FormatBorder::Medium),
    }

    // Word wrap
    if style.wrap_text {
        format = format.set_text_wrap();
    }

    // Number format
    let num_format = style.number_format.to_format_code();
    if !num_format.is_empty() {
        format = format.set_num_format(&num_format);
    }

    format
}

fn color_to_xlsx(color: &Color) -> rust_xlsxwriter::Color {
    rust_xlsxwriter::Color::RGB(color.to_rgb())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_values;
    use engine::style::CellStyle;

    #[test]
    fn test_excel_serial() {
        assert_eq!(excel_serial(&NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()), 2.0);
        assert_eq!(excel_serial(&NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), 45292.0);
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");

        let mut wb = Workbook::new();
        let header = CellStyle::new()
            .with_bold(true)
            .with_background(Color::new(0xFF, 0xD9, 0x66))
            .with_border(BorderLineStyle::Thin);
        {
            let sheet = wb.add_sheet("Summary").unwrap();
            sheet.write_cell((1, 0), CellValue::text("Line of Business: LTC"), &header);
            sheet.set_column_width(2, 70.0);
            sheet.set_row_height(1, 20.0);
        }
        {
            let sheet = wb.add_sheet("1-001").unwrap();
            sheet.write_cell((0, 0), CellValue::text("Issue State"), &header);
            sheet.write_cell((0, 1), CellValue::text("Count"), &header);
            sheet.write_cell((1, 0), CellValue::text("CA"), &CellStyle::new());
            sheet.write_cell((1, 1), CellValue::Number(2.0), &CellStyle::new());
            sheet.write_cell((2, 0), CellValue::Empty, &header);
            sheet.write_cell(
                (2, 1),
                CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
                &CellStyle::new(),
            );
            sheet.set_autofilter((0, 0), (2, 1));
        }

        save_xlsx(&wb, &path).unwrap();
        let sheets = load_values(&path).unwrap();

        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Summary", "1-001"]);
        assert_eq!(sheets[0].get((1, 0)), Some(&CellValue::text("Line of Business: LTC")));
        assert_eq!(sheets[1].get((0, 1)), Some(&CellValue::text("Count")));
        assert_eq!(sheets[1].get((1, 1)), Some(&CellValue::Number(2.0)));
        assert_eq!(sheets[1].get((2, 0)), None);
    }
}
