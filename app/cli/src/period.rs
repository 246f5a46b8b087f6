//! FILENAME: app/cli/src/period.rs
// PURPOSE: Reporting period text for the Summary sheet header.

use chrono::{Datelike, NaiveDate};

/// Accepted input patterns, tried in order. Month-first wins over day-first.
const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Period shown when no dates are given.
pub const DEFAULT_REPORTING_PERIOD: &str = "January 1, 2024 through December 31, 2024";

pub fn parse_report_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

/// "January 5, 2024" for any recognised input; anything else is returned unchanged.
pub fn format_report_date(input: &str) -> String {
    match parse_report_date(input) {
        Some(date) => format!("{} {}, {}", date.format("%B"), date.day(), date.year()),
        None => input.to_string(),
    }
}

/// "{start} through {end}".
pub fn reporting_period(start: &str, end: &str) -> String {
    format!("{} through {}", format_report_date(start), format_report_date(end))
}
