//! Parser error types and related utilities
//!

use thiserror::Error;

/// The "kind" of error generated while parsing a schema literal.
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A `required` or `nonempty` rule that isn't a boolean.
    MalformedFlag,
    /// A `length` or `size` rule that isn't a number or `{min, max}`.
    MalformedBounds,
    /// An `enum` rule that isn't an array.
    MalformedEnum,
    /// A `match` rule that isn't a valid regular expression.
    MalformedPattern,
    /// A `message` rule that isn't a string or a map of strings.
    MalformedMessage,
    /// A nonspecific parsing error.
    Unparseable,
}

/// An error that occurred while parsing a schema literal.
#[derive(Debug, PartialEq, Error)]
// thiserror will generate a Display implementation.
#[error("{kind:?}({ctx})")]
pub struct ParseError {
    /// The "kind" of error generated during parsing.
    pub kind: ErrorKind,
    /// The path in the schema literal where the error was found.
    pub ctx: String,
}

#[cfg_attr(not(feature = "serde_json"), allow(dead_code))]
pub(crate) fn parse_error<S: Into<String>>(kind: ErrorKind, ctx: S) -> ParseError {
    ParseError {
        kind,
        ctx: ctx.into(),
    }
}
