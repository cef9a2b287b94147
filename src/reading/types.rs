//! The `Reading` record and parsing of its raw text fields.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{Error, Result};

/// Layout used when printing or exporting a timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Built-in timestamp layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Cell contents treated as a missing value.
const MISSING_MARKERS: &[&str] = &["", "nan", "na", "n/a", "null"];

/// One `(entity, timestamp, value)` observation.
///
/// Immutable once recorded; the store only appends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// Named subject of the reading (building, sensor, station).
    pub entity: String,
    /// Local wall-clock time of the observation.
    pub timestamp: NaiveDateTime,
    /// Observed value. Non-negative for energy or rainfall, not enforced.
    pub value: f64,
}

impl Reading {
    /// Creates a reading from already-typed fields.
    pub fn new(entity: impl Into<String>, timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            entity: entity.into(),
            timestamp,
            value,
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}: {}",
            self.entity,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.value
        )
    }
}

/// Parses a timestamp using the built-in layouts, then `extra_formats`.
///
/// RFC 3339 input is converted to UTC and the offset dropped. A bare
/// `YYYY-MM-DD` date maps to midnight.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if no layout matches.
pub fn parse_timestamp(raw: &str, extra_formats: &[String]) -> Result<NaiveDateTime> {
    let s = raw.trim();

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.naive_utc());
    }
    if let Some(ts) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(ts);
    }
    for fmt in extra_formats {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ts);
        }
        if let Some(ts) = NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(ts);
        }
    }

    Err(Error::InvalidTimestamp(raw.to_string()))
}

/// Returns `true` if the cell holds no usable value (empty or a NaN marker).
pub fn is_missing(raw: &str) -> bool {
    let s = raw.trim();
    MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m))
}

/// Parses a finite numeric value.
///
/// # Errors
///
/// Returns [`Error::MissingValue`] for an empty or NaN cell and
/// [`Error::InvalidValue`] for anything else that is not a finite number.
pub fn parse_value(raw: &str) -> Result<f64> {
    if is_missing(raw) {
        return Err(Error::MissingValue);
    }
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Error::InvalidValue(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_minute_precision_timestamp() {
        let ts = parse_timestamp("2024-01-01 10:00", &[]).ok();
        assert_eq!(ts.map(|t| t.hour()), Some(10));
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let ts = parse_timestamp("2024-02-05", &[]).ok();
        assert_eq!(ts.map(|t| t.hour()), Some(0));
        assert_eq!(ts.map(|t| t.date().to_string()), Some("2024-02-05".into()));
    }

    #[test]
    fn parses_rfc3339_as_utc() {
        let ts = parse_timestamp("2024-01-01T10:00:00+02:00", &[]).ok();
        assert_eq!(ts.map(|t| t.hour()), Some(8));
    }

    #[test]
    fn extra_formats_are_tried() {
        let extra = vec!["%d/%m/%Y".to_string()];
        assert!(parse_timestamp("05/02/2024", &[]).is_err());
        let ts = parse_timestamp("05/02/2024", &extra).ok();
        assert_eq!(ts.map(|t| t.date().to_string()), Some("2024-02-05".into()));
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        let err = parse_timestamp("yesterday", &[]);
        assert!(matches!(err, Err(Error::InvalidTimestamp(_))));
    }

    #[test]
    fn value_parsing_distinguishes_missing_from_invalid() {
        assert_eq!(parse_value(" 12.5 ").ok(), Some(12.5));
        assert!(matches!(parse_value(""), Err(Error::MissingValue)));
        assert!(matches!(parse_value("NaN"), Err(Error::MissingValue)));
        assert!(matches!(parse_value("abc"), Err(Error::InvalidValue(_))));
        assert!(matches!(parse_value("inf"), Err(Error::InvalidValue(_))));
    }
}
