//! Date formatting for display.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Display format: two-digit day, two-digit month, four-digit year.
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Format a backend timestamp as `dd/mm/yyyy`.
///
/// Accepts RFC 3339 timestamps, offset-less `LocalDateTime` values
/// (`2024-03-05T14:30:00`, optionally with fractional seconds) and plain
/// dates. Blank input yields an empty string; anything unparseable is
/// returned unchanged.
///
/// ```
/// use shopfront_core::format_display_date;
///
/// assert_eq!(format_display_date("2024-03-05T14:30:00"), "05/03/2024");
/// assert_eq!(format_display_date(""), "");
/// ```
#[must_use]
pub fn format_display_date(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return String::new();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY_FORMAT).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.format(DISPLAY_FORMAT).to_string();
    }

    input.to_string()
}
