//! Lenient timestamp parsing for collector-written dates.
//!
//! The collector has emitted RFC 3339 strings, a malformed `+00:00Z` suffix,
//! naive ISO strings, and `git log %ci` dates (`2025-07-28 10:00:00 +0000`).
//! Everything without an offset is taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Fix the `+00:00Z` double-offset the collector sometimes writes.
pub fn clean_timestamp(raw: &str) -> String {
    raw.trim().replace("+00:00Z", "Z")
}

/// Parse a collector timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = clean_timestamp(raw);
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(&cleaned, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// "3 days ago", "1 hour ago", "Just now"; "Invalid date" when unparseable.
pub fn format_relative(raw: &str, now: DateTime<Utc>) -> String {
    let Some(ts) = parse_timestamp(raw) else {
        return "Invalid date".to_string();
    };
    let minutes = (now - ts).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        "Just now".to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    format!("{n} {unit}{} ago", if n > 1 { "s" } else { "" })
}

/// `2025-08-01 12:00 UTC`, or the raw string when unparseable.
pub fn format_datetime(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Whole hours elapsed since `raw`, if it parses.
pub fn hours_since(raw: &str, now: DateTime<Utc>) -> Option<i64> {
    parse_timestamp(raw).map(|ts| (now - ts).num_hours())
}
