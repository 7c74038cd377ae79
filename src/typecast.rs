//! Built-in typecasters.
//!
//! Each typecaster makes a best-effort conversion into one type.  A value
//! that can't be converted is returned unchanged; the `type` validator will
//! then report it, so a failed cast never becomes an error of its own.

use crate::value::{Kind, Value};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::convert::TryFrom;

/// Cast to a string.  Numbers, booleans and dates are rendered as text.
pub fn to_string(value: Value) -> Value {
    match value {
        Value::Bool(_) | Value::Integer(_) | Value::Number(_) | Value::Date(_) => {
            Value::Text(value.to_string())
        }
        _ => value,
    }
}

/// Cast to a number.
///
/// Numeric strings are parsed (surrounding whitespace is ignored), booleans
/// become 1 or 0, and dates become milliseconds since the Unix epoch.
/// Strings spelling NaN or infinity are not numbers.
pub fn to_number(value: Value) -> Value {
    match value {
        Value::Text(s) => match parse_number(s.trim()) {
            Some(n) => n,
            None => Value::Text(s),
        },
        Value::Bool(b) => Value::Integer(b.into()),
        Value::Date(d) => Value::Integer(d.timestamp_millis().into()),
        _ => value,
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(i) = s.parse::<i128>() {
        return Some(Value::Integer(i));
    }
    match s.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(Value::Number(n)),
        _ => None,
    }
}

/// Cast to a boolean.
///
/// Recognizes the usual spellings of true and false in strings; any nonzero
/// number is true.
pub fn to_boolean(value: Value) -> Value {
    match value {
        Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Value::Bool(true),
            "false" | "0" | "no" | "off" | "" => Value::Bool(false),
            _ => Value::Text(s),
        },
        Value::Integer(i) => Value::Bool(i != 0),
        Value::Number(n) => Value::Bool(n != 0.0 && !n.is_nan()),
        _ => value,
    }
}

/// Cast to a date.
///
/// Accepts RFC 3339 timestamps, plain `YYYY-MM-DD` dates (midnight UTC), and
/// numbers as milliseconds since the Unix epoch.
pub fn to_date(value: Value) -> Value {
    match value {
        Value::Text(s) => match parse_date(s.trim()) {
            Some(d) => Value::Date(d),
            None => Value::Text(s),
        },
        Value::Integer(i) => match i64::try_from(i).ok().and_then(from_millis) {
            Some(d) => Value::Date(d),
            None => value,
        },
        Value::Number(n) if n.is_finite() => {
            #[allow(clippy::cast_possible_truncation)]
            let millis = n as i64;
            match from_millis(millis) {
                Some(d) => Value::Date(d),
                None => value,
            }
        }
        _ => value,
    }
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Cast to an array.
///
/// A string is split on commas; any other single value is wrapped.
pub fn to_array(value: Value) -> Value {
    match value {
        Value::Array(_) | Value::Null => value,
        Value::Text(s) => Value::Array(s.split(',').map(Value::from).collect()),
        other => Value::Array(vec![other]),
    }
}

/// The typecaster for types that have no conversion (`object`, `null`).
pub fn identity(value: Value) -> Value {
    value
}

/// A typecaster implemented as a plain function.
pub type CastFn = fn(Value) -> Value;

/// The built-in typecasters, by the type they cast to.
pub fn builtin_typecasters() -> Vec<(Kind, CastFn)> {
    vec![
        (Kind::String, to_string as CastFn),
        (Kind::Number, to_number),
        (Kind::Boolean, to_boolean),
        (Kind::Date, to_date),
        (Kind::Array, to_array),
        (Kind::Object, identity),
        (Kind::Null, identity),
    ]
}
