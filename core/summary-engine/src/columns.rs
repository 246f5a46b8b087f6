//! FILENAME: core/summary-engine/src/columns.rs
//! PURPOSE: Pairs the display headers of a detail table with query fields.
//! CONTEXT: Configured headers ("Policy No", "Issue State") rarely match the
//! column names a query returns. Headers are matched by position while the
//! row still has columns at that position, then by separator-normalized name,
//! and finally fall back to the header itself (which writes blank cells when
//! no such field exists).

use engine::Row;
use serde::{Deserialize, Serialize};

use crate::resolver::normalize_field_name;

/// One detail column: what the header says and which field fills it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub display: String,
    pub field: String,
}

impl ColumnMapping {
    fn same(name: &str) -> Self {
        ColumnMapping {
            display: name.to_string(),
            field: name.to_string(),
        }
    }
}

/// Maps display headers onto the fields of `sample_row`.
///
/// Without display headers the row's own field names are used in query order.
/// Without a sample row every header maps to itself.
pub fn map_columns(display_columns: Option<&[String]>, sample_row: Option<&Row>) -> Vec<ColumnMapping> {
    let actual: Vec<&str> = sample_row.map(|r| r.keys().collect()).unwrap_or_default();

    let display_columns = match display_columns {
        Some(columns) if !columns.is_empty() => columns,
        _ => return actual.iter().map(|k| ColumnMapping::same(k)).collect(),
    };

    display_columns
        .iter()
        .enumerate()
        .map(|(i, display)| {
            if let Some(field) = actual.get(i) {
                return ColumnMapping {
                    display: display.clone(),
                    field: field.to_string(),
                };
            }
            let wanted = normalize_field_name(display);
            match actual.iter().find(|k| normalize_field_name(k) == wanted) {
                Some(field) => ColumnMapping {
                    display: display.clone(),
                    field: field.to_string(),
                },
                None => ColumnMapping::same(display),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn fields(mapping: &[ColumnMapping]) -> Vec<&str> {
        mapping.iter().map(|m| m.field.as_str()).collect()
    }

    #[test]
    fn test_positional_match() {
        let row = Row::from_pairs([("POLICY_NUM", "P1"), ("ISSUE_STATE", "CA")]);
        let display = names(&["Policy No", "Issue State"]);
        let mapping = map_columns(Some(display.as_slice()), Some(&row));
        assert_eq!(mapping[0].display, "Policy No");
        assert_eq!(fields(&mapping), vec!["POLICY_NUM", "ISSUE_STATE"]);
    }

    #[test]
    fn test_name_match_after_positions_run_out() {
        let row = Row::from_pairs([("Policy_Num", "P1"), ("Resident_State", "NY")]);
        let display = names(&["Policy", "State", "Resident State", "Company"]);
        let mapping = map_columns(Some(display.as_slice()), Some(&row));
        assert_eq!(fields(&mapping), vec!["Policy_Num", "Resident_State", "Resident_State", "Company"]);
    }

    #[test]
    fn test_null_display_uses_row_fields() {
        let row = Row::from_pairs([("B", 1.0), ("A", 2.0)]);
        let mapping = map_columns(None, Some(&row));
        assert_eq!(mapping, vec![ColumnMapping::same("B"), ColumnMapping::same("A")]);
    }

    #[test]
    fn test_without_sample_row() {
        let display = names(&["X", "Y"]);
        assert_eq!(fields(&map_columns(Some(display.as_slice()), None)), vec!["X", "Y"]);
        assert!(map_columns(None, None).is_empty());
    }
}
