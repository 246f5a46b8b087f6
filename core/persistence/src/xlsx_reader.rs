//! FILENAME: core/persistence/src/xlsx_reader.rs
//! Value-only reading of saved reports. Styles are not read back.

use crate::PersistenceError;
use calamine::{open_workbook, Data, Reader, Xlsx};
use engine::cell::CellValue;
use engine::coord::CellCoord;
use std::collections::HashMap;
use std::path::Path;

/// Non-empty cell values of one worksheet, keyed by absolute 0-based coordinate.
#[derive(Debug, Clone)]
pub struct SheetValues {
    pub name: String,
    pub cells: HashMap<CellCoord, CellValue>,
}

impl SheetValues {
    pub fn get(&self, coord: CellCoord) -> Option<&CellValue> {
        self.cells.get(&coord)
    }

    /// Text of a cell, empty when nothing is there.
    pub fn text(&self, coord: CellCoord) -> String {
        self.get(coord).map(|v| v.display_value()).unwrap_or_default()
    }
}

/// Reads every sheet of an XLSX file in workbook order.
pub fn load_values(path: &Path) -> Result<Vec<SheetValues>, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::new();

    for sheet_name in &sheet_names {
        let range = workbook.worksheet_range(sheet_name)?;
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        let mut cells = HashMap::new();
        for (row_idx, row) in range.rows().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let value = match cell {
                    Data::Empty => continue,
                    Data::String(s) => CellValue::Text(s.clone()),
                    Data::Float(f) => CellValue::Number(*f),
                    Data::Int(i) => CellValue::Number(*i as f64),
                    Data::Bool(b) => CellValue::Boolean(*b),
                    Data::Error(e) => CellValue::Text(format!("{:?}", e)),
                    Data::DateTime(dt) => match dt.as_datetime() {
                        Some(datetime) => CellValue::Date(datetime.date()),
                        None => CellValue::Number(dt.as_f64()),
                    },
                    Data::DateTimeIso(s) => CellValue::Text(s.clone()),
                    Data::DurationIso(s) => CellValue::Text(s.clone()),
                };
                let coord = (start_row + row_idx as u32, start_col + col_idx as u32);
                cells.insert(coord, value);
            }
        }

        sheets.push(SheetValues {
            name: sheet_name.clone(),
            cells,
        });
    }

    Ok(sheets)
}
