//! FILENAME: core/engine/src/cell.rs
//! PURPOSE: Defines the scalar values flowing from query rows into sheet cells.
//! CONTEXT: This file contains the `CellValue` enum shared by query rows,
//! summary aggregates and written cells, and the `Cell` struct stored in a grid.
//! A cell stores its value plus an index into the sheet's StyleRegistry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A scalar produced by a query or an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Date(NaiveDate),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Null in the query sense (SQL NULL or an absent value).
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Null, or text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Direct numeric coercion: numbers as-is, text that parses as a float.
    /// No digit extraction here; see the aggregation engine for the lenient form.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Returns the display value as a String.
    /// Used for group keys, distinct counting and column width measurement.
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => {
                // Format without unnecessary decimal places
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{:.0}", n)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => {
                if *b { "TRUE" } else { "FALSE" }.to_string()
            }
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Number(_) => 0,
            CellValue::Date(_) => 1,
            CellValue::Text(_) => 2,
            CellValue::Boolean(_) => 3,
            CellValue::Empty => 4,
        }
    }

    /// Total order used by MIN/MAX. Values of the same kind compare naturally;
    /// mixed kinds order numbers < dates < text < booleans < empty.
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Empty
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

/// The atomic unit of a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: CellValue,
    pub style_index: usize,
}

impl Cell {
    pub fn new(value: CellValue, style_index: usize) -> Self {
        Cell { value, style_index }
    }

    pub fn new_text(text: String) -> Self {
        Cell::new(CellValue::Text(text), 0)
    }

    pub fn new_number(num: f64) -> Self {
        Cell::new(CellValue::Number(num), 0)
    }

    pub fn display_value(&self) -> String {
        self.value.display_value()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new(CellValue::Empty, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value_drops_integral_fraction() {
        assert_eq!(CellValue::Number(42.0).display_value(), "42");
        assert_eq!(CellValue::Number(2.5).display_value(), "2.5");
        assert_eq!(CellValue::Empty.display_value(), "");
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(CellValue::Date(d).display_value(), "2024-03-09");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(CellValue::text(" 15 ").as_number(), Some(15.0));
        assert_eq!(CellValue::text("abc").as_number(), None);
        assert_eq!(CellValue::Boolean(true).as_number(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn test_blank_and_null() {
        assert!(CellValue::Empty.is_null());
        assert!(CellValue::text("  ").is_blank());
        assert!(!CellValue::text("  ").is_null());
        assert!(!CellValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_compare_mixed_kinds() {
        assert_eq!(CellValue::Number(3.0).compare(&CellValue::Number(10.0)), Ordering::Less);
        assert_eq!(CellValue::text("b").compare(&CellValue::text("a")), Ordering::Greater);
        assert_eq!(CellValue::Number(99.0).compare(&CellValue::text("1")), Ordering::Less);
    }
}
