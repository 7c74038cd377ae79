//! This module defines error and result types.
//!

use crate::parser::ParseError;
use std::fmt;
use std::result::Result;
use thiserror::Error;

/// The error type for schema construction and validation.
#[non_exhaustive]
#[derive(Debug, PartialEq, Error)]
pub enum ValidateError {
    /// A data mismatch during validation.
    #[error("{0}")]
    Mismatch(Mismatch),
    /// A property refers to a validator that isn't registered.
    #[error("MissingValidator({0})")]
    MissingValidator(String),
    /// A property declares a type that has no typecaster.
    #[error("MissingTypecaster({0})")]
    MissingTypecaster(String),
    /// A logical error in the schema definition.
    #[error("Structural({0})")]
    Structural(String),
    /// A data value that can't be validated.
    #[error("ValueError({0})")]
    ValueError(String),
    /// A schema literal that couldn't be parsed.
    #[error(transparent)]
    ParseError(#[from] ParseError),
}

impl ValidateError {
    /// Report whether this error should stop a validation pass.
    ///
    /// Only a `Mismatch` is an expected outcome of validating data; every
    /// other variant points at the schema or the caller.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ValidateError::Mismatch(_))
    }

    /// Return the data mismatch, if that's what this error is.
    pub fn as_mismatch(&self) -> Option<&Mismatch> {
        match self {
            ValidateError::Mismatch(m) => Some(m),
            _ => None,
        }
    }
}

/// A data mismatch during validation.
///
/// If the schema required a `string` at `author.name` and the data contained
/// a number, this is the error that would result.  At most one `Mismatch` is
/// produced per concrete path in a single validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// The concrete path of the failing value, e.g. `posts.0.title`.
    pub path: String,
    /// The rendered failure message.
    pub message: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Shortcut for creating mismatch errors.
#[doc(hidden)]
pub fn mismatch<P: Into<String>, M: Into<String>>(path: P, message: M) -> ValidateError {
    ValidateError::Mismatch(Mismatch {
        path: path.into(),
        message: message.into(),
    })
}

/// A validation that doesn't return anything.
pub type ValidateResult = Result<(), ValidateError>;

#[test]
fn test_fatal() {
    assert!(!mismatch("a", "a is required.").is_fatal());
    assert!(ValidateError::MissingValidator("hex".into()).is_fatal());
    assert_eq!(
        format!("{}", mismatch("a", "a is required.")),
        "a is required."
    );
}
