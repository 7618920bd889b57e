//! Utility functions for devtasks-core

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Format an instant the way every timestamp column stores it
/// (RFC 3339, UTC, millisecond precision).
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time as a stored timestamp string
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 (what this crate writes) and the naive
/// `YYYY-MM-DD HH:MM:SS` form produced by SQLite's `CURRENT_TIMESTAMP`,
/// which is interpreted as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    None
}

/// Read a due date written as `YYYY-MM-DD` or as the date part of an ISO
/// datetime. Blank and unreadable values mean "no due date".
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Whole seconds between two instants, rounded to nearest and clamped to >= 0
pub fn duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + 500) / 1000
}
