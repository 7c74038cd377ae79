//! This module implements validation of [`serde_json::Value`] data.
//!
//! # Examples
//!
//! ```
//! use dotschema::validate_json_str;
//!
//! let schema = r#"{ "name": { "type": "string", "required": true }, "age": "number" }"#;
//! let json_str = r#"{ "name": "Bob", "age": 43 }"#;
//!
//! assert!(validate_json_str(schema, &json_str).unwrap().is_empty());
//! ```
//!

#![cfg(feature = "serde_json")]

use crate::schema::{Overrides, Schema};
use crate::util::{Mismatch, ValidateError};
use crate::value::{Value, ValueMap};
use chrono::SecondsFormat;
use serde_json::{Map, Number, Value as JSON_Value};
use std::convert::TryFrom;

// Convert JSON `Value`s to the local `Value` type that the validate code
// uses.

impl TryFrom<&JSON_Value> for Value {
    type Error = ValidateError;

    fn try_from(value: &JSON_Value) -> Result<Self, Self::Error> {
        let result = match value {
            JSON_Value::Null => Value::Null,
            JSON_Value::Bool(b) => Value::Bool(*b),
            JSON_Value::Number(num) => {
                if let Some(u) = num.as_u64() {
                    Value::Integer(u.into())
                } else if let Some(i) = num.as_i64() {
                    Value::Integer(i.into())
                } else if let Some(f) = num.as_f64() {
                    Value::Number(f)
                } else {
                    return Err(ValidateError::ValueError(
                        "JSON Value::Number conversion failure".into(),
                    ));
                }
            }
            JSON_Value::String(t) => Value::Text(t.clone()),
            JSON_Value::Array(a) => {
                let array: Result<_, _> = a.iter().map(Value::try_from).collect();
                Value::Array(array?)
            }
            JSON_Value::Object(m) => {
                let map: Result<ValueMap, ValidateError> = m
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), Value::try_from(v)?)))
                    .collect();
                Value::Map(map?)
            }
        };
        Ok(result)
    }
}

// A variant that consumes the JSON Value.
impl TryFrom<JSON_Value> for Value {
    type Error = ValidateError;

    fn try_from(value: JSON_Value) -> Result<Self, Self::Error> {
        Value::try_from(&value)
    }
}

impl From<&Value> for JSON_Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => JSON_Value::Null,
            Value::Bool(b) => JSON_Value::Bool(*b),
            Value::Integer(i) => integer_to_json(*i),
            // NaN and infinities have no JSON form.
            Value::Number(f) => Number::from_f64(*f).map_or(JSON_Value::Null, JSON_Value::Number),
            Value::Text(t) => JSON_Value::String(t.clone()),
            Value::Date(d) => JSON_Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Array(a) => JSON_Value::Array(a.iter().map(JSON_Value::from).collect()),
            Value::Map(m) => {
                let map: Map<String, JSON_Value> = m
                    .iter()
                    .map(|(k, v)| (k.clone(), JSON_Value::from(v)))
                    .collect();
                JSON_Value::Object(map)
            }
        }
    }
}

impl From<Value> for JSON_Value {
    fn from(value: Value) -> Self {
        JSON_Value::from(&value)
    }
}

// Integers outside the range of i64 and u64 have no exact JSON form.
fn integer_to_json(i: i128) -> JSON_Value {
    if let Ok(n) = i64::try_from(i) {
        JSON_Value::Number(n.into())
    } else if let Ok(n) = u64::try_from(i) {
        JSON_Value::Number(n.into())
    } else {
        #[allow(clippy::cast_precision_loss)]
        let f = i as f64;
        Number::from_f64(f).map_or(JSON_Value::Null, JSON_Value::Number)
    }
}

#[test]
fn test_json_number_behavior() {
    // Integers stay integers, however large.
    let json_value: JSON_Value = serde_json::from_str("43").unwrap();
    let value = Value::try_from(&json_value).unwrap();
    assert_eq!(value, Value::Integer(43));
    assert_eq!(JSON_Value::from(&value), json_value);

    for text in &["9007199254740993", "18446744073709551615", "-9223372036854775808"] {
        let json_value: JSON_Value = serde_json::from_str(text).unwrap();
        let value = Value::try_from(&json_value).unwrap();
        assert_eq!(value.to_string(), *text);
        assert_eq!(JSON_Value::from(&value), json_value);
    }
    assert_eq!(
        JSON_Value::from(Value::Integer(i128::from(u64::MAX) + 1)).as_f64(),
        Some(18_446_744_073_709_551_616.0)
    );

    // A float with no fractional part stays a float.
    let json_value: JSON_Value = serde_json::from_str("2.0").unwrap();
    assert_eq!(Value::try_from(&json_value).unwrap(), Value::Number(2.0));

    let json_value: JSON_Value = serde_json::from_str("-1.5").unwrap();
    let value = Value::try_from(&json_value).unwrap();
    assert_eq!(JSON_Value::from(value).as_f64(), Some(-1.5));

    assert_eq!(JSON_Value::from(Value::Number(f64::NAN)), JSON_Value::Null);
}

impl Schema {
    /// Validate JSON data with the default options.
    ///
    /// Stripping and typecasting are written back to `json`.
    pub fn validate_json(&self, json: &mut JSON_Value) -> Result<Vec<Mismatch>, ValidateError> {
        self.validate_json_with(json, &Overrides::default())
    }

    /// Validate JSON data.
    ///
    /// See [`Schema::validate_with`].
    pub fn validate_json_with(
        &self,
        json: &mut JSON_Value,
        overrides: &Overrides,
    ) -> Result<Vec<Mismatch>, ValidateError> {
        let original = Value::try_from(&*json)?;
        let mut value = original.clone();
        let errors = self.validate_with(&mut value, overrides)?;
        if value != original {
            *json = JSON_Value::from(value);
        }
        Ok(errors)
    }

    /// Validate JSON data, returning it if it's valid.
    ///
    /// See [`Schema::assert`].
    pub fn assert_json(&self, json: JSON_Value) -> Result<JSON_Value, ValidateError> {
        let value = Value::try_from(json)?;
        self.assert(value).map(JSON_Value::from)
    }
}

/// Validate JSON-encoded data against a JSON schema literal.
///
/// Returns every mismatch found; an empty list means the data is valid.
pub fn validate_json_str(schema: &str, json: &str) -> Result<Vec<Mismatch>, ValidateError> {
    let schema = Schema::from_json_str(schema)?;

    // Deserialize the JSON bytes
    let json_value: JSON_Value =
        serde_json::from_str(json).map_err(|e| ValidateError::ValueError(format!("{}", e)))?;

    let mut value = Value::try_from(json_value)?;
    schema.validate(&mut value)
}
