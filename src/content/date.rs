//! Front-matter date normalization

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Canonical UTC display form, e.g. `Sat, 01 May 2021 00:00:00 GMT`
const UTC_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// A successfully parsed front-matter date, always in UTC.
///
/// Serializes to the canonical UTC string. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDate(DateTime<Utc>);

impl UtcDate {
    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for UtcDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(UTC_FORMAT))
    }
}

impl Serialize for UtcDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UtcDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_date_string(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s)))
    }
}

/// Normalize a raw front-matter `date` value.
///
/// Strings are parsed in the common blog formats (naive values are taken as
/// UTC), integers are Unix timestamps in milliseconds. Anything else is `None`.
pub fn parse_date(value: &serde_yaml::Value) -> Option<UtcDate> {
    match value {
        serde_yaml::Value::String(s) => parse_date_string(s),
        serde_yaml::Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(UtcDate),
        serde_yaml::Value::Tagged(tagged) => parse_date(&tagged.value),
        _ => None,
    }
}

/// Parse a date string in various formats
pub fn parse_date_string(s: &str) -> Option<UtcDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(UtcDate(dt.with_timezone(&Utc)));
    }

    // RFC 2822, which also reads back our own display form
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(UtcDate(dt.with_timezone(&Utc)));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(UtcDate(dt.and_utc()));
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| UtcDate(dt.and_utc()));
        }
    }

    None
}
