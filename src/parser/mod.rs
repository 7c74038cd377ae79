//! This module parses JSON schema literals into a [`Definition`].
//!
//! The literal follows these shapes, recursively:
//!
//! - a string is a type name: `"name": "string"`
//! - a one-element array is an array of that definition: `"tags": ["string"]`
//! - a longer array gives one definition per index: `"pair": ["string", "number"]`
//! - an object with a string `type`, or with only rule names as keys, is a
//!   rule set: `"age": { "type": "number", "size": { "min": 0 } }`
//! - any other object is a nested object definition.
//!
//! Recognized rule names are `type`, `required`, `nonempty`, `length`,
//! `size`, `enum`, `match`, `each`, `elements`, and `message`, plus the names
//! of any validators registered on the schema.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "serde_json")]
//! # {
//! use dotschema::Schema;
//!
//! let schema = Schema::from_json_str(r#"{
//!     "name": { "type": "string", "required": true },
//!     "tags": ["string"]
//! }"#).unwrap();
//! assert!(schema.property("tags.$").is_some());
//! # }
//! ```

mod parse_err;

#[doc(inline)]
pub use parse_err::{ErrorKind, ParseError};

#[cfg(feature = "serde_json")]
pub use literal::parse_definition;

#[cfg(feature = "serde_json")]
mod literal {
    use super::parse_err::{parse_error, ErrorKind, ParseError};
    use crate::ast::{Definition, Rule, Rules};
    use crate::path::{join, EACH};
    use crate::property::{Arg, Bounds};
    use crate::schema::Schema;
    use crate::util::{ValidateError, ValidateResult};
    use crate::value::Value;
    use regex::Regex;
    use serde_json::{Map, Value as JSON_Value};
    use std::convert::TryFrom;

    const RULE_KEYWORDS: &[&str] = &[
        "type", "required", "nonempty", "length", "size", "enum", "match", "each", "elements",
        "message",
    ];

    type JsonMap = Map<String, JSON_Value>;

    type ParseResult<T> = Result<T, ParseError>;

    /// Parse a JSON schema literal.
    ///
    /// `is_validator` reports whether a name is a registered validator, so
    /// that it can be used as a rule key.  A top-level object always
    /// describes fields, even if its keys look like rule names.
    pub fn parse_definition<F>(json: &JSON_Value, is_validator: F) -> ParseResult<Definition>
    where
        F: Fn(&str) -> bool,
    {
        match json {
            JSON_Value::Object(m) => parse_fields(m, &is_validator, ""),
            _ => parse_node(json, &is_validator, ""),
        }
    }

    fn parse_node(
        json: &JSON_Value,
        known: &dyn Fn(&str) -> bool,
        at: &str,
    ) -> ParseResult<Definition> {
        match json {
            JSON_Value::String(type_name) => Ok(Definition::from(type_name.as_str())),
            JSON_Value::Array(a) => match a.len() {
                0 => Ok(Definition::from("array")),
                1 => Ok(Definition::each(parse_node(&a[0], known, &join(at, EACH))?)),
                _ => Ok(Definition::Elements(parse_elements(a, known, at)?)),
            },
            JSON_Value::Object(m) if is_rule_set(m, known) => {
                Ok(Definition::Rules(parse_rules(m, known, at)?))
            }
            JSON_Value::Object(m) => parse_fields(m, known, at),
            _ => Err(parse_error(ErrorKind::Unparseable, at)),
        }
    }

    fn parse_fields(
        m: &JsonMap,
        known: &dyn Fn(&str) -> bool,
        at: &str,
    ) -> ParseResult<Definition> {
        let mut fields = Vec::new();
        for (key, value) in m {
            fields.push((key.clone(), parse_node(value, known, &join(at, key))?));
        }
        Ok(Definition::Nested(fields))
    }

    fn parse_elements(
        a: &[JSON_Value],
        known: &dyn Fn(&str) -> bool,
        at: &str,
    ) -> ParseResult<Vec<Definition>> {
        a.iter()
            .enumerate()
            .map(|(i, v)| parse_node(v, known, &join(at, &i.to_string())))
            .collect()
    }

    // An object is a rule set if it has a string `type`, or if every key
    // names a rule.  Otherwise it describes a nested object.
    fn is_rule_set(m: &JsonMap, known: &dyn Fn(&str) -> bool) -> bool {
        match m.get("type") {
            Some(JSON_Value::String(_)) => true,
            Some(_) => false,
            None => {
                !m.is_empty() && m.keys().all(|k| RULE_KEYWORDS.contains(&k.as_str()) || known(k))
            }
        }
    }

    fn parse_rules(m: &JsonMap, known: &dyn Fn(&str) -> bool, at: &str) -> ParseResult<Rules> {
        let mut rules = Rules::new();
        for (key, v) in m {
            let rule = match key.as_str() {
                "type" => match v {
                    JSON_Value::String(s) => Rule::Type(s.clone()),
                    _ => return Err(parse_error(ErrorKind::Unparseable, at)),
                },
                "required" => Rule::Required(parse_flag(v, at)?),
                "nonempty" => Rule::Nonempty(parse_flag(v, at)?),
                "length" => Rule::Length(parse_bounds(v, at)?),
                "size" => Rule::Size(parse_bounds(v, at)?),
                "enum" => match v {
                    JSON_Value::Array(a) => {
                        let values: ParseResult<Vec<Value>> =
                            a.iter().map(|v| to_value(v, at)).collect();
                        Rule::Enum(values?)
                    }
                    _ => return Err(parse_error(ErrorKind::MalformedEnum, at)),
                },
                "match" => Rule::Match(parse_pattern(v, at)?),
                "each" => Rule::Each(Box::new(parse_node(v, known, &join(at, EACH))?)),
                "elements" => match v {
                    JSON_Value::Array(a) => Rule::Elements(parse_elements(a, known, at)?),
                    _ => return Err(parse_error(ErrorKind::Unparseable, at)),
                },
                "message" => match v {
                    JSON_Value::String(s) => Rule::Message(None, s.as_str().into()),
                    JSON_Value::Object(messages) => {
                        for (name, text) in messages {
                            let text = text
                                .as_str()
                                .ok_or_else(|| parse_error(ErrorKind::MalformedMessage, at))?;
                            rules = rules.message_for(name.as_str(), text);
                        }
                        continue;
                    }
                    _ => return Err(parse_error(ErrorKind::MalformedMessage, at)),
                },
                name => Rule::Custom(name.to_string(), Arg::Value(to_value(v, at)?)),
            };
            rules = rules.with(rule);
        }
        Ok(rules)
    }

    fn parse_flag(v: &JSON_Value, at: &str) -> ParseResult<bool> {
        v.as_bool()
            .ok_or_else(|| parse_error(ErrorKind::MalformedFlag, at))
    }

    // Either an exact number, or `{ "min": x, "max": y }` with both optional.
    fn parse_bounds(v: &JSON_Value, at: &str) -> ParseResult<Bounds> {
        let malformed = || parse_error(ErrorKind::MalformedBounds, at);
        match v {
            JSON_Value::Number(n) => Ok(Bounds::exact(n.as_f64().ok_or_else(malformed)?)),
            JSON_Value::Object(m) => {
                let mut bounds = Bounds::default();
                for (key, limit) in m {
                    let limit = limit.as_f64().ok_or_else(malformed)?;
                    match key.as_str() {
                        "min" => bounds.min = Some(limit),
                        "max" => bounds.max = Some(limit),
                        _ => return Err(malformed()),
                    }
                }
                Ok(bounds)
            }
            _ => Err(malformed()),
        }
    }

    fn parse_pattern(v: &JSON_Value, at: &str) -> ParseResult<Regex> {
        let re = v
            .as_str()
            .ok_or_else(|| parse_error(ErrorKind::MalformedPattern, at))?;
        Regex::new(re)
            .map_err(|e| parse_error(ErrorKind::MalformedPattern, format!("{}: {}", at, e)))
    }

    fn to_value(v: &JSON_Value, at: &str) -> ParseResult<Value> {
        Value::try_from(v).map_err(|_| parse_error(ErrorKind::Unparseable, at))
    }

    impl Schema {
        /// Compile a schema from a JSON schema literal.
        pub fn from_json(json: &JSON_Value) -> Result<Schema, ValidateError> {
            let mut schema = Schema::new();
            schema.extend_json(json)?;
            Ok(schema)
        }

        /// Compile a schema from JSON schema literal text.
        pub fn from_json_str(json: &str) -> Result<Schema, ValidateError> {
            let json: JSON_Value = serde_json::from_str(json)
                .map_err(|e| ValidateError::ValueError(format!("{}", e)))?;
            Schema::from_json(&json)
        }

        /// Add the fields of a JSON schema literal to this schema.
        ///
        /// Validators already registered on this schema may be used as rule
        /// keys.
        pub fn extend_json(&mut self, json: &JSON_Value) -> ValidateResult {
            let validators = &self.ctx.validators;
            let def = parse_definition(json, |name| validators.contains_key(name))?;
            self.extend(def)
        }
    }

}
