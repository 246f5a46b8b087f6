//! FILENAME: core/engine/src/layout.rs
//! PURPOSE: Computes where a table's header and data cells land on a sheet.
//! CONTEXT: Several tables share one sheet (a detail listing plus summaries
//! side by side). Each table is planned independently from its own anchor;
//! the planner never looks at other tables, so callers pick anchors that do
//! not overlap.

use crate::coord::{a1_to_coord, CellCoord, CoordError};

/// Cell positions for one table. All coordinates are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    /// One coordinate per column, on the anchor row.
    pub header_cells: Vec<CellCoord>,
    /// `row_count` rows of `column_count` coordinates, starting below the header.
    pub data_cells: Vec<Vec<CellCoord>>,
}

impl TablePlan {
    pub fn column_count(&self) -> usize {
        self.header_cells.len()
    }

    pub fn row_count(&self) -> usize {
        self.data_cells.len()
    }

    /// Top-left corner (the first header cell).
    pub fn anchor(&self) -> Option<CellCoord> {
        self.header_cells.first().copied()
    }

    /// Bottom-right corner: last data cell, or last header cell for an empty table.
    pub fn last_cell(&self) -> Option<CellCoord> {
        self.data_cells
            .last()
            .and_then(|row| row.last().copied())
            .or_else(|| self.header_cells.last().copied())
    }

    /// 0-based columns covered by this table.
    pub fn columns(&self) -> std::ops::Range<u32> {
        match (self.header_cells.first(), self.header_cells.last()) {
            (Some(first), Some(last)) => first.1..last.1 + 1,
            _ => 0..0,
        }
    }
}

/// Plans a table whose header sits at `anchor_column` / `anchor_row` (1-based row).
pub fn plan_table(
    anchor_column: &str,
    anchor_row: u32,
    column_count: usize,
    row_count: usize,
) -> Result<TablePlan, CoordError> {
    let (header_row, first_col) = a1_to_coord(anchor_column, anchor_row)?;

    let header_cells = (0..column_count as u32)
        .map(|offset| (header_row, first_col + offset))
        .collect();

    let data_cells = (0..row_count as u32)
        .map(|r| {
            (0..column_count as u32)
                .map(|offset| (header_row + 1 + r, first_col + offset))
                .collect()
        })
        .collect();

    Ok(TablePlan {
        header_cells,
        data_cells,
    })
}
