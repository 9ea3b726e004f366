// Core types shared across the transform stages

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use std::fmt;

/// Calendar day of a record in `YYYYMMDD` form.
///
/// Only constructed from a date (or a validated 8-digit string), so it is
/// always digit-only and safe to use as a partition path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayKey(String);

impl DayKey {
    /// `None` for years outside 0000-9999, which have no 8-digit form.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        if !(0..=9999).contains(&date.year()) {
            return None;
        }
        Some(Self(date.format("%Y%m%d").to_string()))
    }

    /// Parse an existing `YYYYMMDD` string, rejecting anything that is not a real date
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(Self::from_date)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> &str {
        &self.0[..4]
    }

    pub fn month(&self) -> &str {
        &self.0[4..6]
    }

    pub fn day(&self) -> &str {
        &self.0[6..]
    }

    /// Hive partition dimensions in path order: year, month, day
    pub fn dimensions(&self) -> [(&'static str, &str); 3] {
        [
            ("year", self.year()),
            ("month", self.month()),
            ("day", self.day()),
        ]
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Typed, normalized access-log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub remote_addr: String,
    pub remote_user: String,
    pub time_local: DateTime<FixedOffset>,
    pub request_method: String,
    pub request_url: String,
    pub request_protocol: String,
    pub response_status: i64,
    pub bytes_sent: i64,
    pub http_referrer: String,
    pub http_user_agent: String,
    /// ISO-8601 rendering of `time_local` including the offset
    pub datetime: String,
    /// Partitioning metadata; never written as a column
    pub day_key: DayKey,
}
