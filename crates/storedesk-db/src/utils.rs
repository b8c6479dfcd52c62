//! Shared row-decoding and date helpers

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use sqlx::any::AnyRow;
use sqlx::{Row, ValueRef};

/// Output format for derived timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a timestamp as rendered by either backend when cast to text.
///
/// Accepts RFC3339, `YYYY-MM-DD HH:MM:SS[.f][+zz[:zz]]` and bare dates.
/// Offsets are dropped; the wall-clock value is kept.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Shift a raw timestamp by `by`, rendering the result in [`TIMESTAMP_FORMAT`].
/// Unparseable or missing input yields `None`.
pub fn shift_timestamp(raw: Option<&str>, by: Duration) -> Option<String> {
    raw.and_then(parse_timestamp)
        .map(|dt| (dt + by).format(TIMESTAMP_FORMAT).to_string())
}

fn is_null(row: &AnyRow, column: &str) -> Result<bool, sqlx::Error> {
    Ok(row.try_get_raw(column)?.is_null())
}

/// Read a column as text, stringifying numbers. NULL becomes `None`.
pub fn text(row: &AnyRow, column: &str) -> Result<Option<String>, sqlx::Error> {
    if is_null(row, column)? {
        return Ok(None);
    }
    let value = row
        .try_get::<String, _>(column)
        .ok()
        .or_else(|| row.try_get::<i64, _>(column).ok().map(|v| v.to_string()))
        .or_else(|| row.try_get::<f64, _>(column).ok().map(|v| v.to_string()));
    Ok(value)
}

/// Read a column as text, substituting an empty string for NULL
pub fn text_or_empty(row: &AnyRow, column: &str) -> Result<String, sqlx::Error> {
    Ok(text(row, column)?.unwrap_or_default())
}

/// Read a column as a number. NULL and non-numeric values become 0.
pub fn number(row: &AnyRow, column: &str) -> Result<f64, sqlx::Error> {
    if is_null(row, column)? {
        return Ok(0.0);
    }
    let value = row
        .try_get::<f64, _>(column)
        .ok()
        .or_else(|| row.try_get::<i64, _>(column).ok().map(|v| v as f64))
        .or_else(|| row.try_get::<i32, _>(column).ok().map(f64::from))
        .or_else(|| {
            row.try_get::<String, _>(column)
                .ok()
                .and_then(|s| s.trim().parse::<f64>().ok())
        });
    Ok(value.filter(|v| v.is_finite()).unwrap_or(0.0))
}

/// Read a column as a whole count
pub fn count(row: &AnyRow, column: &str) -> Result<i64, sqlx::Error> {
    if is_null(row, column)? {
        return Ok(0);
    }
    match row.try_get::<i64, _>(column) {
        Ok(v) => Ok(v),
        Err(_) => Ok(number(row, column)?.round() as i64),
    }
}

/// Uppercase an optional string in place
pub fn upper(value: Option<String>) -> Option<String> {
    value.map(|s| s.to_uppercase())
}
