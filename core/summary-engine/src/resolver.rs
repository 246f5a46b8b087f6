//! FILENAME: core/summary-engine/src/resolver.rs
//! PURPOSE: Finds the column a logical field name refers to.
//! CONTEXT: Query results spell columns inconsistently (`ISSUE_STATE`,
//! `Issue State`, `TAT_IN_DAYS`). Every grouping and aggregation lookup goes
//! through `resolve` so the tolerance rules live in one place. Matching is a
//! cascade; the first stage that finds a column wins:
//! exact, case-insensitive, separator-normalized, turnaround-days synonyms,
//! then prefix overlap.

use engine::{CellValue, Row};

/// Minimum share of the longer normalized name a prefix must cover.
const PREFIX_OVERLAP_RATIO: f64 = 0.7;

/// Spellings seen for the turnaround-days column.
const TAT_SYNONYMS: &[&str] = &[
    "TAT_in_Days",
    "TAT_IN_DAYS",
    "TAT_Days",
    "TAT In Days",
    "TATinDays",
    "TAT_DAYS",
    "TAT",
];

/// Uppercase, with runs of `_`, `-` and spaces collapsed to one `_` and
/// leading/trailing separators removed.
pub fn normalize_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.trim().chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            pending_separator = true;
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('_');
        }
        pending_separator = false;
        out.extend(c.to_uppercase());
    }
    out
}

fn is_tat_name(normalized: &str) -> bool {
    TAT_SYNONYMS
        .iter()
        .any(|s| normalize_field_name(s) == normalized)
}

/// Returns the row key `logical_name` resolves to, if any.
pub fn resolve_key<'a>(row: &'a Row, logical_name: &str) -> Option<&'a str> {
    if logical_name.trim().is_empty() {
        return None;
    }

    // Exact
    if let Some(key) = row.keys().find(|k| *k == logical_name) {
        return Some(key);
    }

    // Case-insensitive
    let lowered = logical_name.to_lowercase();
    if let Some(key) = row.keys().find(|k| k.to_lowercase() == lowered) {
        return Some(key);
    }

    // Separator-normalized
    let wanted = normalize_field_name(logical_name);
    if wanted.is_empty() {
        return None;
    }
    let normalized_keys: Vec<(&str, String)> =
        row.keys().map(|k| (k, normalize_field_name(k))).collect();
    if let Some((key, _)) = normalized_keys.iter().find(|(_, n)| *n == wanted) {
        return Some(key);
    }

    // Turnaround-days synonyms
    if is_tat_name(&wanted) {
        for synonym in TAT_SYNONYMS {
            let candidate = normalize_field_name(synonym);
            if let Some((key, _)) = normalized_keys.iter().find(|(_, n)| *n == candidate) {
                return Some(key);
            }
        }
    }

    // Prefix overlap
    normalized_keys
        .iter()
        .find(|(_, n)| prefix_overlaps(&wanted, n))
        .map(|(key, _)| *key)
}

fn prefix_overlaps(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    longer.starts_with(shorter)
        && (shorter.chars().count() as f64) >= PREFIX_OVERLAP_RATIO * (longer.chars().count() as f64)
}

/// Looks up `logical_name` in `row` with the tolerant cascade.
pub fn resolve<'a>(row: &'a Row, logical_name: &str) -> Option<&'a CellValue> {
    resolve_key(row, logical_name).and_then(|key| row.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(keys: &[&str]) -> Row {
        Row::from_pairs(keys.iter().enumerate().map(|(i, k)| (*k, i as f64)))
    }

    #[test]
    fn test_normalize_field_name() {
        assert_eq!(normalize_field_name("Issue State"), "ISSUE_STATE");
        assert_eq!(normalize_field_name("issue-state"), "ISSUE_STATE");
        assert_eq!(normalize_field_name("__Issue__ _State_"), "ISSUE_STATE");
        assert_eq!(normalize_field_name("TATinDays"), "TATINDAYS");
        assert_eq!(normalize_field_name("  "), "");
    }

    #[test]
    fn test_exact_wins_over_case_insensitive() {
        let r = row(&["state", "State"]);
        assert_eq!(resolve_key(&r, "State"), Some("State"));
        assert_eq!(resolve_key(&r, "STATE"), Some("state"));
    }

    #[test]
    fn test_normalized_match() {
        let r = row(&["Policy_Num", "ISSUE_STATE"]);
        assert_eq!(resolve_key(&r, "Issue_State"), Some("ISSUE_STATE"));
        assert_eq!(resolve_key(&r, "issue state"), Some("ISSUE_STATE"));
        assert_eq!(resolve_key(&r, "Issue-State"), Some("ISSUE_STATE"));
    }

    #[test]
    fn test_resolution_is_stable_across_spellings() {
        let r = row(&["ISSUE_STATE"]);
        let a = resolve(&r, "Issue_State");
        let b = resolve(&r, "issue state");
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[test]
    fn test_tat_synonyms() {
        let r = row(&["Policy_Num", "TAT_DAYS"]);
        assert_eq!(resolve_key(&r, "TAT_in_Days"), Some("TAT_DAYS"));

        let r = row(&["TATinDays"]);
        assert_eq!(resolve_key(&r, "TAT In Days"), Some("TATinDays"));

        // Non-TAT names never use the synonym list
        let r = row(&["TAT"]);
        assert_eq!(resolve_key(&r, "Company"), None);
    }

    #[test]
    fn test_prefix_overlap() {
        // RESIDENT_ST is 11 of 14 characters of RESIDENT_STATE
        let r = row(&["Resident_St"]);
        assert_eq!(resolve_key(&r, "Resident_State"), Some("Resident_St"));

        // ISSUE is 5 of 11 characters: too short
        let r = row(&["Issue"]);
        assert_eq!(resolve_key(&r, "Issue_State"), None);
    }

    #[test]
    fn test_unresolved() {
        let r = row(&["A", "B"]);
        assert_eq!(resolve(&r, "Company"), None);
        assert_eq!(resolve(&r, ""), None);
        assert_eq!(resolve(&Row::new(), "A"), None);
    }
}
