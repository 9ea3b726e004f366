// Type coercion and date derivation for parsed access-log lines
//
// Every record is coerced on its own and returns a Result, so the batch
// driver can either stop at the first failure or collect failures and keep
// the good records. Which of the two happens is the caller's choice.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

use crate::error::{CoercionError, OptionsError};
use crate::field_names as field;
use crate::parse::RawFields;
use crate::types::{DayKey, Record};

/// Timestamp layout of `time_local`, without the zone
pub const TIME_LOCAL_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

/// Offset applied when none is configured: +09:00
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// Settings that shape normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Offset at which every `time_local` is interpreted. The log's own zone
    /// token is never used to pick the offset.
    pub utc_offset: FixedOffset,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS)
                .expect("+09:00 is within the valid offset range"),
        }
    }
}

impl NormalizeOptions {
    pub fn with_utc_offset(utc_offset: FixedOffset) -> Self {
        Self { utc_offset }
    }
}

/// What to do with a record that fails coercion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRecordPolicy {
    /// Abort the whole batch on the first failure
    #[default]
    FailFast,
    /// Drop failing records, report them, keep the rest
    Collect,
}

/// A coercion failure tied to its position in the batch
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("record {index}: {error}")]
pub struct RecordError {
    pub index: usize,
    #[source]
    pub error: CoercionError,
}

/// Output of batch normalization
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<Record>,
    /// Always empty under `InvalidRecordPolicy::FailFast`
    pub rejected: Vec<RecordError>,
}

/// Parse a `+HH:MM` / `+HHMM` offset string (sign required).
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, OptionsError> {
    let invalid = || OptionsError::InvalidUtcOffset(value.to_string());

    let mut parsed = Parsed::new();
    format::parse(&mut parsed, value, StrftimeItems::new("%z")).map_err(|_| invalid())?;
    parsed.to_fixed_offset().map_err(|_| invalid())
}

/// Coerce one parsed line into a typed record.
pub fn normalize_record(
    raw: RawFields,
    options: &NormalizeOptions,
) -> Result<Record, CoercionError> {
    let time_local = parse_time_local(&raw.time_local, options.utc_offset)?;
    let response_status = parse_integer(field::RESPONSE_STATUS, &raw.response_status)?;
    let bytes_sent = parse_integer(field::BYTES_SENT, &raw.bytes_sent)?;

    let datetime = time_local.format("%Y-%m-%dT%H:%M:%S%:z").to_string();
    let day_key = DayKey::from_date(time_local.date_naive()).ok_or_else(|| {
        CoercionError::TimeLocal {
            value: raw.time_local.clone(),
            reason: "year is outside 0000-9999".to_string(),
        }
    })?;

    Ok(Record {
        remote_addr: raw.remote_addr,
        remote_user: raw.remote_user,
        time_local,
        request_method: raw.request_method,
        request_url: raw.request_url,
        request_protocol: raw.request_protocol,
        response_status,
        bytes_sent,
        http_referrer: raw.http_referrer,
        http_user_agent: raw.http_user_agent,
        datetime,
        day_key,
    })
}

/// Normalize a whole batch under the given policy.
///
/// Unmatched lines must already be filtered out; this only ever sees
/// complete `RawFields`.
pub fn normalize(
    raws: Vec<RawFields>,
    options: &NormalizeOptions,
    policy: InvalidRecordPolicy,
) -> Result<Normalized, RecordError> {
    let mut out = Normalized {
        records: Vec::with_capacity(raws.len()),
        rejected: Vec::new(),
    };

    for (index, raw) in raws.into_iter().enumerate() {
        match normalize_record(raw, options) {
            Ok(record) => out.records.push(record),
            Err(error) => {
                let failure = RecordError { index, error };
                match policy {
                    InvalidRecordPolicy::FailFast => return Err(failure),
                    InvalidRecordPolicy::Collect => {
                        tracing::debug!(index, error = %failure.error, "Rejected record");
                        out.rejected.push(failure);
                    }
                }
            }
        }
    }

    Ok(out)
}

fn parse_time_local(
    value: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, CoercionError> {
    let invalid = |reason: String| CoercionError::TimeLocal {
        value: value.to_string(),
        reason,
    };

    let stamp = match value.split_once(' ') {
        Some((stamp, zone)) => {
            let matches_offset = parse_utc_offset(zone).map_or(false, |zone| zone == offset);
            if !matches_offset {
                return Err(invalid(format!(
                    "zone '{}' does not match configured offset {}",
                    zone, offset
                )));
            }
            stamp
        }
        None => value,
    };

    if !has_time_local_shape(stamp) {
        return Err(invalid(format!("expected {}", TIME_LOCAL_FORMAT)));
    }

    let naive = NaiveDateTime::parse_from_str(stamp, TIME_LOCAL_FORMAT)
        .map_err(|e| invalid(e.to_string()))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| invalid("ambiguous local time".to_string()))
}

/// `DD/Mon/YYYY:HH:MM:SS` with every numeric part at full ASCII width.
/// chrono alone would also take short or signed years.
fn has_time_local_shape(stamp: &str) -> bool {
    let b = stamp.as_bytes();
    b.len() == 20
        && [0, 1, 7, 8, 9, 10, 12, 13, 15, 16, 18, 19]
            .iter()
            .all(|&i| b[i].is_ascii_digit())
        && b[3..6].iter().all(u8::is_ascii_alphabetic)
        && b[2] == b'/'
        && b[6] == b'/'
        && b[11] == b':'
        && b[14] == b':'
        && b[17] == b':'
}

fn parse_integer(field: &'static str, value: &str) -> Result<i64, CoercionError> {
    let invalid = |reason: String| CoercionError::Integer {
        field,
        value: value.to_string(),
        reason,
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("not a digit string".to_string()));
    }

    value.parse::<i64>().map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(time_local: &str, status: &str, bytes: &str) -> RawFields {
        RawFields {
            remote_addr: "203.0.113.7".to_string(),
            remote_user: "-".to_string(),
            time_local: time_local.to_string(),
            request_method: "GET".to_string(),
            request_url: "/".to_string(),
            request_protocol: "HTTP/1.1".to_string(),
            response_status: status.to_string(),
            bytes_sent: bytes.to_string(),
            http_referrer: "-".to_string(),
            http_user_agent: "curl/8.4.0".to_string(),
        }
    }

    #[test]
    fn test_datetime_and_day_key_derivation() {
        let record = normalize_record(
            raw("10/Oct/2023:13:55:36", "200", "2326"),
            &NormalizeOptions::default(),
        )
        .unwrap();

        assert_eq!(record.datetime, "2023-10-10T13:55:36+09:00");
        assert_eq!(record.day_key.as_str(), "20231010");
        assert_eq!(record.response_status, 200);
        assert_eq!(record.bytes_sent, 2326);
        // 13:55:36 at +09:00 is 04:55:36 UTC
        assert_eq!(record.time_local.timestamp(), 1_696_913_736);
    }

    #[test]
    fn test_matching_zone_token_is_accepted() {
        let record = normalize_record(
            raw("10/Oct/2023:13:55:36 +0900", "200", "1"),
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(record.datetime, "2023-10-10T13:55:36+09:00");

        // Extended form of the same offset
        let record = normalize_record(
            raw("10/Oct/2023:13:55:36 +09:00", "200", "1"),
            &NormalizeOptions::default(),
        )
        .unwrap();
        assert_eq!(record.day_key.as_str(), "20231010");
    }

    #[test]
    fn test_other_zone_token_is_rejected() {
        let err = normalize_record(
            raw("10/Oct/2023:13:55:36 +0000", "200", "1"),
            &NormalizeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.field(), field::TIME_LOCAL);
    }

    #[test]
    fn test_configured_offset_changes_rendering_not_day() {
        let options = NormalizeOptions::with_utc_offset(parse_utc_offset("-05:00").unwrap());
        let record = normalize_record(raw("31/Dec/2023:23:59:59", "404", "0"), &options).unwrap();

        assert_eq!(record.datetime, "2023-12-31T23:59:59-05:00");
        assert_eq!(record.day_key.as_str(), "20231231");
    }

    #[test]
    fn test_bad_timestamps() {
        for value in [
            "2023-10-10 13:55:36",
            "10/Foo/2023:13:55:36",
            "32/Oct/2023:00:00:00",
            "",
            // short and signed years
            "10/Oct/23:13:55:36",
            "10/Oct/+12345:13:55:36",
            "10/Oct/+2023:13:55:36",
            "1/Oct/2023:13:55:36",
        ] {
            let err = normalize_record(raw(value, "200", "1"), &NormalizeOptions::default())
                .unwrap_err();
            assert!(matches!(err, CoercionError::TimeLocal { .. }), "{value}");
        }
    }

    #[test]
    fn test_bad_integers() {
        let options = NormalizeOptions::default();

        let err = normalize_record(raw("10/Oct/2023:13:55:36", "2x0", "1"), &options).unwrap_err();
        assert_eq!(err.field(), field::RESPONSE_STATUS);

        let err = normalize_record(raw("10/Oct/2023:13:55:36", "200", "-1"), &options).unwrap_err();
        assert_eq!(err.field(), field::BYTES_SENT);

        let err = normalize_record(
            raw("10/Oct/2023:13:55:36", "200", "99999999999999999999"),
            &options,
        )
        .unwrap_err();
        assert_eq!(err.field(), field::BYTES_SENT);
    }

    #[test]
    fn test_fail_fast_reports_first_bad_index() {
        let batch = vec![
            raw("10/Oct/2023:13:55:36", "200", "1"),
            raw("bad", "200", "1"),
            raw("also bad", "200", "1"),
        ];

        let err = normalize(
            batch,
            &NormalizeOptions::default(),
            InvalidRecordPolicy::FailFast,
        )
        .unwrap_err();
        assert_eq!(err.index, 1);
    }

    #[test]
    fn test_collect_keeps_valid_records() {
        let batch = vec![
            raw("10/Oct/2023:13:55:36", "200", "1"),
            raw("bad", "200", "1"),
            raw("11/Oct/2023:00:00:00", "500", "7"),
        ];

        let out = normalize(
            batch,
            &NormalizeOptions::default(),
            InvalidRecordPolicy::Collect,
        )
        .unwrap();

        assert_eq!(out.records.len(), 2);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].index, 1);
        assert_eq!(out.records[1].response_status, 500);
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(
            parse_utc_offset("+09:00").unwrap().local_minus_utc(),
            9 * 3600
        );
        assert_eq!(
            parse_utc_offset("+0530").unwrap().local_minus_utc(),
            5 * 3600 + 30 * 60
        );
        assert_eq!(
            parse_utc_offset("-03:30").unwrap().local_minus_utc(),
            -(3 * 3600 + 30 * 60)
        );
        for bad in ["09:00", "+9:00", "+24:00", "+09:60", "+09-00", "+09:00x", "UTC", ""] {
            assert!(parse_utc_offset(bad).is_err(), "{bad}");
        }
    }
}
