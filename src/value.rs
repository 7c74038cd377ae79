//! This module declares a generic Value enum for use with validation.
//!
//! It also contains the type classifier: the function that decides whether a
//! value is a `string`, an `array`, an `object`, and so on.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::{Display, IntoStaticStr};

/// A map from field name to value.
pub type ValueMap = BTreeMap<String, Value>;

/// `Value` represents all the types of data we can validate.
///
/// Integers and floating-point numbers are kept apart so that integers
/// survive a round trip exactly; both classify as [`Kind::Number`].
///
/// To validate a new type of data, write conversions between that type and
/// `Value`.  See the [`json`] module for an example.
///
/// [`json`]: crate::json
///
#[derive(Clone, Debug, PartialEq)]
#[allow(missing_docs)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i128),
    Number(f64),
    Text(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    Map(ValueMap),
}

/// The type classification of a value.
///
/// `Undefined` is the classification of a field that isn't present at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[allow(missing_docs)]
pub enum Kind {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Date,
    Array,
    Object,
}

impl Kind {
    /// The lowercase type name, as used by the `type` validator.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Classify a value, or a missing value.
pub fn classify(value: Option<&Value>) -> Kind {
    match value {
        None => Kind::Undefined,
        Some(v) => v.kind(),
    }
}

impl Value {
    /// Classify this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Integer(_) | Value::Number(_) => Kind::Number,
            Value::Text(_) => Kind::String,
            Value::Date(_) => Kind::Date,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Object,
        }
    }

    /// `true` if this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the contents of a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value of a number, as an f64.
    ///
    /// Integers too large for an f64 are rounded.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => {
                #[allow(clippy::cast_precision_loss)]
                let f = *i as f64;
                Some(f)
            }
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Compare two values, treating integers and floats with the same
    /// numeric value as equal.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(_), Value::Number(_)) | (Value::Number(_), Value::Integer(_)) => {
                self.as_f64() == other.as_f64()
            }
            _ => self == other,
        }
    }

    /// The length of a string (in characters) or an array.
    ///
    /// Other values have no length.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::Text(s) => Some(s.chars().count()),
            Value::Array(a) => Some(a.len()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Integer(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Integer(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Value {
        Value::Integer(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Value {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Value {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

// Display is used when rendering messages, so it prints values the way a
// person would write them: strings unquoted, whole numbers without a
// fractional part.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Number(n) => write_number(*n, f),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Value::Array(a) => {
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", v)?;
                }
                Ok(())
            }
            Value::Map(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

// 2^53: beyond this, f64 can't represent every integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

fn write_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        #[allow(clippy::cast_possible_truncation)]
        let i = n as i64;
        write!(f, "{}", i)
    } else {
        write!(f, "{}", n)
    }
}
