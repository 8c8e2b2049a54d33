//! Date helper functions

use chrono::{DateTime, TimeZone};

/// Format a date with a chrono format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "%Y-%m-%d") // -> "2024-01-15"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format(format).to_string()
}

/// Format a date for `<time datetime>` and JSON feeds
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
