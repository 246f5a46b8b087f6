//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the sheet model.
//! CONTEXT: Re-exports public types and modules for use by other crates.

pub mod cell;
pub mod coord;
pub mod grid;
pub mod layout;
pub mod row;
pub mod style;

// Re-export commonly used types at the crate root
pub use cell::{Cell, CellValue};
pub use coord::{
    a1_to_coord, coord_to_a1, index_to_letter, letter_to_index, range_to_a1, CellCoord,
    CoordError, MAX_COLUMN,
};
pub use grid::Grid;
pub use layout::{plan_table, TablePlan};
pub use row::Row;
pub use style::{
    BorderLineStyle, CellStyle, Color, FontStyle, NumberFormat, StyleRegistry, TextAlign,
    VerticalAlign,
};
