//! FILENAME: core/engine/src/grid.rs
//! PURPOSE: Manages the collection of cells written to one worksheet.
//! CONTEXT: This file defines the `Grid` struct which acts as the container
//! for all cell data. It uses a sparse storage strategy (HashMap) since
//! report sheets place small tables at scattered anchors.

use std::collections::HashMap;

use crate::cell::Cell;
use crate::coord::CellCoord;

/// Sparse map from (row, col) to cell. Row and Col are 0-based indices.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    pub cells: HashMap<CellCoord, Cell>,

    /// Highest row index currently in use.
    pub max_row: u32,

    /// Highest column index currently in use.
    pub max_col: u32,
}

impl Grid {
    pub fn new() -> Self {
        Grid {
            cells: HashMap::new(),
            max_row: 0,
            max_col: 0,
        }
    }

    /// Sets a cell at the specified coordinates.
    /// Updates max_row/max_col boundaries automatically.
    pub fn set_cell(&mut self, row: u32, col: u32, cell: Cell) {
        if row > self.max_row {
            self.max_row = row;
        }
        if col > self.max_col {
            self.max_col = col;
        }
        self.cells.insert((row, col), cell);
    }

    /// Returns None if nothing was written at the coordinates.
    pub fn get_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Cells in reading order (row, then column).
    pub fn sorted_cells(&self) -> Vec<(CellCoord, &Cell)> {
        let mut cells: Vec<(CellCoord, &Cell)> =
            self.cells.iter().map(|(&pos, cell)| (pos, cell)).collect();
        cells.sort_by_key(|(pos, _)| *pos);
        cells
    }

    /// Longest display text per column, in characters.
    pub fn column_text_widths(&self) -> HashMap<u32, usize> {
        let mut widths: HashMap<u32, usize> = HashMap::new();
        for (&(_, col), cell) in &self.cells {
            let len = cell.display_value().chars().count();
            let entry = widths.entry(col).or_insert(0);
            if len > *entry {
                *entry = len;
            }
        }
        widths
    }
}
