//! FILENAME: core/persistence/src/lib.rs
//! Report Persistence Module
//!
//! Holds the in-memory workbook a report is composed into and saves it in
//! XLSX format. Reading is limited to plain cell values, used to check
//! written reports.

mod error;
mod xlsx_reader;
mod xlsx_writer;

pub use error::PersistenceError;
pub use xlsx_reader::{load_values, SheetValues};
pub use xlsx_writer::save_xlsx;

use engine::cell::{Cell, CellValue};
use engine::coord::CellCoord;
use engine::grid::Grid;
use engine::style::{CellStyle, StyleRegistry};
use std::collections::HashMap;

/// Longest sheet name Excel accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

// ============================================================================
// WORKBOOK
// ============================================================================

/// Represents a complete workbook that can be saved
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self { sheets: Vec::new() }
    }

    /// Appends a sheet, rejecting names Excel would refuse.
    pub fn add_sheet(&mut self, name: &str) -> Result<&mut Sheet, PersistenceError> {
        validate_sheet_name(name)?;
        if self.sheets.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            return Err(PersistenceError::DuplicateSheet(name.to_string()));
        }
        self.sheets.push(Sheet::new(name.to_string()));
        let index = self.sheets.len() - 1;
        Ok(&mut self.sheets[index])
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet, PersistenceError> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

fn validate_sheet_name(name: &str) -> Result<(), PersistenceError> {
    let invalid = name.trim().is_empty()
        || name.chars().count() > MAX_SHEET_NAME_LEN
        || name.contains(FORBIDDEN_SHEET_CHARS)
        || name.starts_with('\'')
        || name.ends_with('\'');
    if invalid {
        return Err(PersistenceError::InvalidSheetName(name.to_string()));
    }
    Ok(())
}

// ============================================================================
// SHEET
// ============================================================================

/// Represents a single worksheet
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub grid: Grid,
    pub styles: StyleRegistry,
    /// Column widths in Excel character units.
    pub column_widths: HashMap<u32, f64>,
    /// Row heights in points.
    pub row_heights: HashMap<u32, f64>,
    /// Inclusive (first, last) corners of the auto-filter range.
    pub autofilter: Option<(CellCoord, CellCoord)>,
}

impl Sheet {
    pub fn new(name: String) -> Self {
        Self {
            name,
            grid: Grid::new(),
            styles: StyleRegistry::new(),
            column_widths: HashMap::new(),
            row_heights: HashMap::new(),
            autofilter: None,
        }
    }

    /// Writes a value with a style, registering the style on first use.
    pub fn write_cell(&mut self, coord: CellCoord, value: CellValue, style: &CellStyle) {
        let style_index = self.styles.get_or_create(style.clone());
        self.grid.set_cell(coord.0, coord.1, Cell::new(value, style_index));
    }

    pub fn cell_value(&self, coord: CellCoord) -> Option<&CellValue> {
        self.grid.get_cell(coord.0, coord.1).map(|c| &c.value)
    }

    pub fn cell_style(&self, coord: CellCoord) -> Option<&CellStyle> {
        self.grid
            .get_cell(coord.0, coord.1)
            .map(|c| self.styles.get(c.style_index))
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub fn set_autofilter(&mut self, first: CellCoord, last: CellCoord) {
        self.autofilter = Some((first, last));
    }

    /// Sizes every written column to its longest text plus padding, capped at `max_width`.
    pub fn autofit_columns(&mut self, padding: f64, max_width: f64) {
        for (col, len) in self.grid.column_text_widths() {
            let width = (len as f64 + padding).min(max_width);
            self.column_widths.insert(col, width);
        }
    }
}
