//! FILENAME: app/cli/src/qualify.rs
// PURPOSE: Prefixes unqualified table names in report queries.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TABLE_REF: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(FROM|JOIN|UPDATE|INSERT\s+INTO)(\s+)([A-Za-z_][A-Za-z0-9_$]*(?:\.[A-Za-z_][A-Za-z0-9_$]*)*)",
    )
    .ok()
});

/// `database.schema` (or whichever part is set) to put in front of bare table names.
pub fn qualifier(database: Option<&str>, schema: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [database, schema]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// Qualifies every table named after FROM, JOIN, UPDATE or INSERT INTO that has no dot.
pub fn qualify_tables(query: &str, database: Option<&str>, schema: Option<&str>) -> String {
    let (prefix, regex) = match (qualifier(database, schema), TABLE_REF.as_ref()) {
        (Some(prefix), Some(regex)) => (prefix, regex),
        _ => return query.to_string(),
    };

    regex
        .replace_all(query, |caps: &Captures| {
            let table = &caps[3];
            if table.contains('.') {
                caps[0].to_string()
            } else {
                format!("{}{}{}.{}", &caps[1], &caps[2], prefix, table)
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_qualifier_leaves_query() {
        let q = "SELECT * FROM CLAIMS";
        assert_eq!(qualify_tables(q, None, None), q);
        assert_eq!(qualify_tables(q, Some(" "), None), q);
    }

    #[test]
    fn test_qualifies_bare_tables() {
        let q = "SELECT a FROM CLAIMS c join Policies p ON c.id = p.id";
        assert_eq!(
            qualify_tables(q, Some("PROD"), Some("LTC")),
            "SELECT a FROM PROD.LTC.CLAIMS c join PROD.LTC.Policies p ON c.id = p.id"
        );
    }

    #[test]
    fn test_schema_only() {
        assert_eq!(
            qualify_tables("select * from t where x = 1", None, Some("main")),
            "select * from main.t where x = 1"
        );
    }

    #[test]
    fn test_keeps_qualified_names_and_subqueries() {
        let q = "SELECT * FROM OTHER.T WHERE id IN (SELECT id FROM (SELECT 1 AS id))";
        assert_eq!(qualify_tables(q, Some("DB"), None), q);
    }

    #[test]
    fn test_update_and_insert() {
        assert_eq!(
            qualify_tables("UPDATE t SET a = 1", Some("DB"), None),
            "UPDATE DB.t SET a = 1"
        );
        assert_eq!(
            qualify_tables("INSERT  INTO t VALUES (1)", Some("DB"), None),
            "INSERT  INTO DB.t VALUES (1)"
        );
    }
}
