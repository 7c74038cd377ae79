//! This module contains the built-in validators and their default messages.
//!
//! Every validator has the same signature: it takes the value (`None` if
//! absent), the validation [`Context`], and its registered [`Arg`], and
//! answers `true` if the value is acceptable.

use crate::context::{validator, Context, Message, ValidatorFn};
use crate::property::{Arg, Bounds, DEFAULT, ENUM, LENGTH, MATCH, NONEMPTY, REQUIRED, SIZE, TYPE};
use crate::value::{classify, Value};
use std::collections::HashMap;

/// Fails on a missing value, `null`, or an empty string, unless the
/// argument is `false`.
pub fn validate_required(value: Option<&Value>, _ctx: &Context, arg: &Arg) -> bool {
    if let Arg::Flag(false) = arg {
        return true;
    }
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Text(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Fails on an empty string, array, or map, unless the argument is `false`.
pub fn validate_nonempty(value: Option<&Value>, _ctx: &Context, arg: &Arg) -> bool {
    if let Arg::Flag(false) = arg {
        return true;
    }
    match value {
        Some(Value::Text(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Map(m)) => !m.is_empty(),
        _ => true,
    }
}

/// Compares the value's classification with the type name in the argument.
pub fn validate_type(value: Option<&Value>, _ctx: &Context, arg: &Arg) -> bool {
    match (value, arg) {
        (None, _) | (Some(Value::Null), _) => true,
        (_, Arg::Name(name)) => classify(value).name() == name.as_str(),
        _ => false,
    }
}

/// Checks the length of a string or array against the bounds in the
/// argument.  Values without a length are not checked.
pub fn validate_length(value: Option<&Value>, _ctx: &Context, arg: &Arg) -> bool {
    let bounds = match arg {
        Arg::Bounds(b) => b,
        _ => return false,
    };
    match value.and_then(Value::length) {
        Some(len) => {
            #[allow(clippy::cast_precision_loss)]
            let len = len as f64;
            bounds.contains(len)
        }
        None => true,
    }
}

/// Checks a number against the bounds in the argument.  Other values are
/// not checked.
pub fn validate_size(value: Option<&Value>, _ctx: &Context, arg: &Arg) -> bool {
    let bounds = match arg {
        Arg::Bounds(b) => b,
        _ => return false,
    };
    match value.and_then(Value::as_f64) {
        Some(n) => bounds.contains(n),
        None => true,
    }
}

/// Requires the value to equal one of the values in the argument.
pub fn validate_enum(value: Option<&Value>, _ctx: &Context, arg: &Arg) -> bool {
    match (value, arg) {
        (Some(v), Arg::Values(allowed)) => allowed.iter().any(|a| a.same_as(v)),
        _ => false,
    }
}

/// Tests the value against the pattern in the argument.
///
/// Numbers and booleans are tested in their text form; other non-string
/// values never match.
pub fn validate_match(value: Option<&Value>, _ctx: &Context, arg: &Arg) -> bool {
    let re = match arg {
        Arg::Pattern(re) => re,
        _ => return false,
    };
    match value {
        Some(Value::Text(s)) => re.is_match(s),
        Some(v @ Value::Integer(_)) | Some(v @ Value::Number(_)) | Some(v @ Value::Bool(_)) => {
            re.is_match(&v.to_string())
        }
        _ => false,
    }
}

pub(crate) fn builtin_validators() -> HashMap<String, ValidatorFn> {
    let mut map = HashMap::new();
    map.insert(REQUIRED.to_string(), validator(validate_required));
    map.insert(NONEMPTY.to_string(), validator(validate_nonempty));
    map.insert(TYPE.to_string(), validator(validate_type));
    map.insert(LENGTH.to_string(), validator(validate_length));
    map.insert(SIZE.to_string(), validator(validate_size));
    map.insert(ENUM.to_string(), validator(validate_enum));
    map.insert(MATCH.to_string(), validator(validate_match));
    map
}

fn num(n: f64) -> String {
    Value::Number(n).to_string()
}

fn length_message(path: &str, arg: &Arg) -> String {
    let bounds = match arg {
        Arg::Bounds(b) => *b,
        _ => Bounds::default(),
    };
    match (bounds.min, bounds.max) {
        (Some(min), Some(max)) if min == max => {
            format!("{} must have a length of {}.", path, num(min))
        }
        (Some(min), Some(max)) => format!(
            "{} must have a length between {} and {}.",
            path,
            num(min),
            num(max)
        ),
        (None, Some(max)) => format!("{} must have a maximum length of {}.", path, num(max)),
        (Some(min), None) => format!("{} must have a minimum length of {}.", path, num(min)),
        (None, None) => format!("{} has an invalid length.", path),
    }
}

fn size_message(path: &str, arg: &Arg) -> String {
    let bounds = match arg {
        Arg::Bounds(b) => *b,
        _ => Bounds::default(),
    };
    match (bounds.min, bounds.max) {
        (Some(min), Some(max)) if min == max => format!("{} must equal {}.", path, num(min)),
        (Some(min), Some(max)) => {
            format!("{} must be between {} and {}.", path, num(min), num(max))
        }
        (None, Some(max)) => format!("{} must be at most {}.", path, num(max)),
        (Some(min), None) => format!("{} must be at least {}.", path, num(min)),
        (None, None) => format!("{} has an invalid size.", path),
    }
}

fn enum_message(path: &str, arg: &Arg) -> String {
    let mut names: Vec<String> = match arg {
        Arg::Values(v) => v.iter().map(Value::to_string).collect(),
        _ => Vec::new(),
    };
    match names.pop() {
        Some(last) if names.is_empty() => format!("{} must be {}.", path, last),
        Some(last) => format!("{} must be either {} or {}.", path, names.join(", "), last),
        None => format!("{} has no allowed values.", path),
    }
}

pub(crate) fn builtin_messages() -> HashMap<String, Message> {
    let mut map = HashMap::new();
    map.insert(
        DEFAULT.to_string(),
        Message::template(|path, _| format!("Validation failed for {}.", path)),
    );
    map.insert(
        REQUIRED.to_string(),
        Message::template(|path, _| format!("{} is required.", path)),
    );
    map.insert(
        NONEMPTY.to_string(),
        Message::template(|path, _| format!("{} must not be empty.", path)),
    );
    map.insert(
        TYPE.to_string(),
        Message::template(|path, arg| format!("{} must be of type {}.", path, arg)),
    );
    map.insert(LENGTH.to_string(), Message::template(length_message));
    map.insert(SIZE.to_string(), Message::template(size_message));
    map.insert(ENUM.to_string(), Message::template(enum_message));
    map.insert(
        MATCH.to_string(),
        Message::template(|path, arg| format!("{} must match {}.", path, arg)),
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::DummyContext;
    use regex::Regex;

    fn with_ctx<F: FnOnce(&Context)>(f: F) {
        let lookup = DummyContext::new();
        let root = Value::Null;
        f(&Context::new(&lookup, &root));
    }

    #[test]
    fn required() {
        with_ctx(|ctx| {
            let yes = Arg::Flag(true);
            assert!(!validate_required(None, ctx, &yes));
            assert!(!validate_required(Some(&Value::Null), ctx, &yes));
            assert!(!validate_required(Some(&Value::from("")), ctx, &yes));
            assert!(validate_required(Some(&Value::from(0)), ctx, &yes));
            assert!(validate_required(Some(&Value::from(false)), ctx, &yes));
            assert!(validate_required(None, ctx, &Arg::Flag(false)));
        });
    }

    #[test]
    fn nonempty() {
        with_ctx(|ctx| {
            let yes = Arg::Flag(true);
            assert!(!validate_nonempty(Some(&Value::from("")), ctx, &yes));
            assert!(!validate_nonempty(Some(&Value::Array(vec![])), ctx, &yes));
            assert!(validate_nonempty(Some(&Value::from(vec![1])), ctx, &yes));
            assert!(validate_nonempty(Some(&Value::from(0)), ctx, &yes));
        });
    }

    #[test]
    fn types() {
        with_ctx(|ctx| {
            let string = Arg::Name("string".into());
            assert!(validate_type(Some(&Value::from("a")), ctx, &string));
            assert!(!validate_type(Some(&Value::from(1)), ctx, &string));
            assert!(validate_type(None, ctx, &string));
            let array = Arg::Name("array".into());
            assert!(validate_type(Some(&Value::from(vec![1])), ctx, &array));
        });
    }

    #[test]
    fn length_and_size() {
        with_ctx(|ctx| {
            let b = Arg::Bounds(Bounds::between(2.0, 3.0));
            assert!(!validate_length(Some(&Value::from("a")), ctx, &b));
            assert!(validate_length(Some(&Value::from("ab")), ctx, &b));
            assert!(!validate_length(Some(&Value::from(vec![1, 2, 3, 4])), ctx, &b));
            assert!(validate_length(Some(&Value::from(7)), ctx, &b));
            assert!(validate_size(Some(&Value::from(2.5)), ctx, &b));
            assert!(!validate_size(Some(&Value::from(4)), ctx, &b));
            assert!(validate_size(Some(&Value::from("long string")), ctx, &b));
        });
    }

    #[test]
    fn enums_and_patterns() {
        with_ctx(|ctx| {
            let e = Arg::Values(vec![Value::from("a"), Value::from(1)]);
            assert!(validate_enum(Some(&Value::from("a")), ctx, &e));
            assert!(validate_enum(Some(&Value::from(1)), ctx, &e));
            assert!(validate_enum(Some(&Value::from(1.0)), ctx, &e));
            assert!(!validate_enum(Some(&Value::from("1")), ctx, &e));
            assert!(!validate_enum(Some(&Value::from("b")), ctx, &e));
            let m = Arg::Pattern(Regex::new("^[0-9]+$").unwrap());
            assert!(validate_match(Some(&Value::from("123")), ctx, &m));
            assert!(validate_match(Some(&Value::from(42)), ctx, &m));
            assert!(!validate_match(Some(&Value::from("12a")), ctx, &m));
            assert!(!validate_match(Some(&Value::from(vec![1])), ctx, &m));
        });
    }

    #[test]
    fn messages() {
        let messages = builtin_messages();
        let render = |name: &str, arg: Arg| messages[name].render("x", &arg);
        assert_eq!(render("default", Arg::None), "Validation failed for x.");
        assert_eq!(
            render("length", Arg::Bounds(Bounds::exact(4.0))),
            "x must have a length of 4."
        );
        assert_eq!(
            render("length", Arg::Bounds(Bounds::between(1.0, 4.0))),
            "x must have a length between 1 and 4."
        );
        assert_eq!(
            render("size", Arg::Bounds(Bounds::min(0.5))),
            "x must be at least 0.5."
        );
        assert_eq!(
            render(
                "enum",
                Arg::Values(vec![Value::from("a"), Value::from("b"), Value::from("c")])
            ),
            "x must be either a, b or c."
        );
        assert_eq!(
            render("match", Arg::Pattern(Regex::new("^a$").unwrap())),
            "x must match /^a$/."
        );
        assert_eq!(
            render("type", Arg::Name("date".into())),
            "x must be of type date."
        );
    }
}
