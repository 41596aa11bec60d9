//! Timestamp parsing for recency ordering.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::error::{DigestError, DigestResult};

/// ISO-8601 layouts carrying an offset. `%#z` takes `Z`, `+hh`, `+hhmm` and `+hh:mm`.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M%#z"];

/// Local date-time layouts accepted without an offset; read as UTC.
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a timestamp into milliseconds since the Unix epoch.
///
/// Accepts RFC 3339 and other ISO-8601 date-times (minute precision, basic
/// offsets), offset-less date-times (UTC) and bare dates (UTC midnight).
///
/// # Errors
/// Returns `Parse` if the string is not a valid date.
pub fn parse_timestamp(input: &str) -> DigestResult<i64> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.timestamp_millis());
    }

    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.timestamp_millis());
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .ok_or_else(|| DigestError::Parse(input.to_string()))
}

/// Parse an untyped JSON value as a timestamp.
///
/// # Errors
/// Returns `InvalidArgument` for non-string values and `Parse` for invalid dates.
pub fn parse_timestamp_value(value: &Value) -> DigestResult<i64> {
    match value {
        Value::String(s) => parse_timestamp(s),
        _ => Err(DigestError::InvalidArgument(
            "argument should be a string".to_string(),
        )),
    }
}
