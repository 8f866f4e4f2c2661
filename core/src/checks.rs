//! Standalone predicates over untyped values.
//!
//! The string-format checks back [`StringSchema`](crate::StringSchema)'s
//! `email`/`url`/`uuid`/`date`/`datetime` formats. The rest are plain
//! boolean helpers for host integrations that want a quick yes/no answer
//! without building a schema.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex must compile"));
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("static regex must compile")
});
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("static regex must compile"));
static PARTIAL_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}(-[0-9]{2})?$").expect("static regex must compile"));

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%MZ",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Returns `true` if `value` parses as an absolute URL.
pub fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// Returns `true` for an 8-4-4-4-12 hex UUID with version 1–5 and an RFC 4122 variant.
pub fn is_uuid(value: &str) -> bool {
    UUID_RE.is_match(value)
}

/// Returns `true` for a `YYYY-MM-DD` string naming a real calendar day.
///
/// # Examples
///
/// ```
/// use valguard_core::checks::is_date;
///
/// assert!(is_date("2024-02-29"));
/// assert!(!is_date("2023-02-29"));
/// assert!(!is_date("2024-2-9"));
/// ```
pub fn is_date(value: &str) -> bool {
    DATE_RE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Returns `true` if `value` parses as a date or date-time.
///
/// Accepts RFC 3339, RFC 2822, ISO 8601 date-times (with `T` or a space
/// separator, seconds optional, `Z` or an offset optional), calendar dates,
/// and the reduced `YYYY-MM` and `YYYY` forms.
pub fn is_datetime(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M%:z").is_ok()
        || NAIVE_DATETIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || is_partial_date(value)
}

fn is_partial_date(value: &str) -> bool {
    if !PARTIAL_DATE_RE.is_match(value) {
        return false;
    }
    let padded = if value.len() == 4 {
        format!("{value}-01-01")
    } else {
        format!("{value}-01")
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d").is_ok()
}

pub fn is_positive(value: &Value) -> bool {
    value.as_f64().is_some_and(|n| n > 0.0)
}

pub fn is_negative(value: &Value) -> bool {
    value.as_f64().is_some_and(|n| n < 0.0)
}

/// Returns `true` for a number with no fractional part.
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => true,
        Value::Number(n) => n.as_f64().is_some_and(is_whole),
        _ => false,
    }
}

/// Returns `true` for a number in `min..=max`.
pub fn in_range(value: &Value, min: f64, max: f64) -> bool {
    value.as_f64().is_some_and(|n| n >= min && n <= max)
}

pub fn has_length(value: &Value, len: usize) -> bool {
    value.as_array().is_some_and(|items| items.len() == len)
}

pub fn min_length(value: &Value, len: usize) -> bool {
    value.as_array().is_some_and(|items| items.len() >= len)
}

pub fn max_length(value: &Value, len: usize) -> bool {
    value.as_array().is_some_and(|items| items.len() <= len)
}

/// Returns `true` if `value` is an object containing every key in `keys`.
pub fn has_keys(value: &Value, keys: &[&str]) -> bool {
    value
        .as_object()
        .is_some_and(|map| keys.iter().all(|key| map.contains_key(*key)))
}

/// Returns `true` if `value` is an object whose keys all appear in `allowed`.
pub fn has_no_extra_keys(value: &Value, allowed: &[&str]) -> bool {
    value
        .as_object()
        .is_some_and(|map| map.keys().all(|key| allowed.contains(&key.as_str())))
}

pub(crate) fn is_whole(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0
}
