//! FILENAME: core/engine/src/coord.rs
//! PURPOSE: Utilities for converting between spreadsheet coordinate formats.
//! CONTEXT: Configuration names columns by letter ("A", "AA") and rows by
//! 1-based number. Column numbers produced here are 1-based ("A" = 1,
//! "Z" = 26, "AA" = 27). `CellCoord` is the 0-based (row, col) pair used by
//! grids and the XLSX writer.

use thiserror::Error;

/// A cell coordinate as (row, col) with 0-based indices.
pub type CellCoord = (u32, u32);

/// Largest column Excel accepts ("XFD").
pub const MAX_COLUMN: u32 = 16_384;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("Invalid column letters: '{0}'")]
    InvalidColumn(String),

    #[error("Row numbers start at 1, got {0}")]
    InvalidRow(u32),
}

/// Converts a column string (e.g., "A", "AA", "xfd") to a 1-based column number.
/// "A" -> 1, "Z" -> 26, "AA" -> 27, "ZZ" -> 702.
///
/// Each letter contributes `value * 26^position` counted from the right.
pub fn letter_to_index(col_str: &str) -> Result<u32, CoordError> {
    let trimmed = col_str.trim();
    if trimmed.is_empty() {
        return Err(CoordError::InvalidColumn(col_str.to_string()));
    }

    let mut result: u32 = 0;
    for c in trimmed.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(CoordError::InvalidColumn(col_str.to_string()));
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add(digit))
            .filter(|r| *r <= MAX_COLUMN)
            .ok_or_else(|| CoordError::InvalidColumn(col_str.to_string()))?;
    }
    Ok(result)
}

/// Converts a 1-based column number to a column string.
/// 1 -> "A", 26 -> "Z", 27 -> "AA". Zero has no letter form and yields "".
pub fn index_to_letter(index: u32) -> String {
    let mut result = String::new();
    let mut n = index;
    while n > 0 {
        let remainder = (n - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// Converts a column string and 1-based row number to a 0-based coordinate.
/// ("A", 1) -> (0, 0), ("AA", 100) -> (99, 26)
pub fn a1_to_coord(col_str: &str, row_num: u32) -> Result<CellCoord, CoordError> {
    if row_num == 0 {
        return Err(CoordError::InvalidRow(row_num));
    }
    let col = letter_to_index(col_str)?;
    Ok((row_num - 1, col - 1))
}

/// Converts a 0-based (row, col) coordinate to an A1-style reference string.
/// (0, 0) -> "A1", (99, 26) -> "AA100"
pub fn coord_to_a1(coord: CellCoord) -> String {
    let (row, col) = coord;
    format!("{}{}", index_to_letter(col + 1), row + 1)
}

/// Range reference such as "A1:G12".
pub fn range_to_a1(first: CellCoord, last: CellCoord) -> String {
    format!("{}:{}", coord_to_a1(first), coord_to_a1(last))
}
