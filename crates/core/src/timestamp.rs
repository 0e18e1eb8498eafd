//! Creation-time parsing and display.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

const ZONED_FORMATS: &[&str] = &["%Y:%m:%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];
const NAIVE_FORMATS: &[&str] = &[
    "%Y:%m:%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];
const DATE_FORMATS: &[&str] = &["%Y:%m:%d", "%Y-%m-%d"];

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([0-9]{4}.*)").expect("static pattern"))
}

/// Extracts epoch seconds from one line of tool output such as
/// `Create Date                     : 2015:06:14 12:34:56`.
///
/// Everything from the first four-digit run onwards is treated as the date.
pub fn parse_creation_line(line: &str) -> Option<i64> {
    let caps = date_pattern().captures(line)?;
    parse_timestamp(caps.get(1)?.as_str())
}

/// Parses an EXIF style date. Values without an offset are read as UTC.
pub fn parse_timestamp(value: &str) -> Option<i64> {
    let value = value.trim();
    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.timestamp());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        }
    }
    None
}

/// Formats epoch seconds as `Y-n-j H:i:s`, e.g. `2015-6-4 09:05:00`.
pub fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%-m-%-d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}
