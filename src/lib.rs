//! `dotschema` is a library for validating nested data against a schema
//! made of dot-delimited property paths.
//!
//! A schema is a flat set of [`Property`] rule sets, each bound to a path
//! like `author.name` or `author.posts.$.title`, where the `$` segment means
//! "each element of the array at this path".  Schemas are usually written as
//! a nested [`Definition`] (or a JSON literal) and compiled once into that
//! flat form.
//!
//! # Implementation Details
//!
//! - Data is validated in a generic form, [`Value`]; the `serde_json`
//!   feature adds conversions and JSON entry points.
//!
//! - Each property checks `required` first, stops if the value is missing
//!   or null, then checks `type`, then runs its other validators in the
//!   order they were added.  At most one failure is reported per path.
//!
//! - Validators, messages, and typecasters live in tables owned by the
//!   [`Schema`] and are looked up by name through a
//!   [`LookupContext`](crate::context::LookupContext) at validation time, so
//!   changes to a table apply to every property.
//!
//! - Before validating, undeclared fields can be stripped and values can be
//!   cast to their declared types; see [`Options`].
//!
//! # Examples
//!
//! This example validates JSON-encoded data against a JSON schema literal:
//!
//! ```
//! # #[cfg(feature = "serde_json")]
//! use dotschema::validate_json_str;
//!
//! let schema = r#"{ "name": { "type": "string", "required": true }, "age": "number" }"#;
//! let json_str = r#"{ "name": "Bob", "age": 43 }"#;
//!
//! # #[cfg(feature = "serde_json")]
//! assert!(validate_json_str(schema, &json_str).unwrap().is_empty());
//! ```
//!
//! If the JSON data doesn't have the expected structure, each failure is
//! reported with its path:
//! ```
//! # #[cfg(feature = "serde_json")]
//! # {
//! use dotschema::validate_json_str;
//!
//! let schema = r#"{ "name": "string", "tags": ["string"] }"#;
//! let json_str = r#"{ "name": "Bob", "tags": ["a", 2] }"#;
//!
//! let errors = validate_json_str(schema, &json_str).unwrap();
//! assert_eq!(errors[0].path, "tags.1");
//! assert_eq!(errors[0].message, "tags.1 must be of type string.");
//! # }
//! ```
//!
//! A similar example, building the schema in Rust:
//! ```
//! use dotschema::{Bounds, Schema, Value};
//!
//! let mut schema = Schema::new();
//! schema.path("name").unwrap().ty("string").required(true).length(Bounds::max(8.0));
//!
//! let mut fields = std::collections::BTreeMap::new();
//! fields.insert("name".to_string(), Value::from("Bartholomew"));
//! let mut person = Value::Map(fields);
//!
//! let errors = schema.validate(&mut person).unwrap();
//! assert_eq!(errors[0].message, "name must have a maximum length of 8.");
//! ```
//!
//! Built-in validators:
//! - `required`, `nonempty`, `type`
//! - `length` (string or array length), `size` (number range)
//! - `enum`, `match`
//!
//! Built-in types: `string`, `number`, `boolean`, `date`, `array`,
//! `object`, `null`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![warn(clippy::cast_possible_truncation)]

pub mod ast;
pub mod context;
pub(crate) mod flatten;
pub mod parser;
pub mod path;
pub mod property;
pub mod schema;
pub mod typecast;
pub mod util;
pub mod validate;
pub mod value;

#[doc(inline)]
pub use ast::{Definition, Rule, Rules};
#[doc(inline)]
pub use context::{typecaster, validator, Message};
#[doc(inline)]
pub use property::{Arg, Bounds, Property};
#[doc(inline)]
pub use schema::{Options, Overrides, PathBuilder, Schema};
#[doc(inline)]
pub use util::{Mismatch, ValidateError, ValidateResult};
#[doc(inline)]
pub use value::{Kind, Value};

#[cfg(feature = "serde_json")]
pub mod json;
#[cfg(feature = "serde_json")]
#[doc(inline)]
pub use json::validate_json_str;
