//! Tools for compiling a [`Definition`] into a schema's flat path mapping.
//!
//! This module is called "flatten" because its goal is to flatten the nesting
//! of a definition into one mapping from dot-path to Property.
//!
//! For example, this definition (written as JSON):
//! ```text
//! { "author": { "name": "string", "posts": [{ "title": "string" }] } }
//! ```
//! compiles to these paths:
//! ```text
//! author              type object
//! author.name         type string
//! author.posts        type array
//! author.posts.$      type object
//! author.posts.$.title  type string
//! ```
//! Validation never recurses into a separate schema: everything it needs is
//! in this one mapping.
//!

use crate::ast::{Definition, Rule, Rules};
use crate::path::{join, split_last, EACH};
use crate::property::{Arg, Property};
use crate::schema::Schema;
use crate::util::ValidateError;
use crate::value::Kind;
use log::debug;

pub(crate) type FlattenResult<T> = std::result::Result<T, ValidateError>;

/// Define every top-level field of a definition on `schema`.
pub(crate) fn flatten(schema: &mut Schema, root: Definition) -> FlattenResult<()> {
    match root {
        Definition::Nested(fields) => {
            for (name, def) in fields {
                define(schema, &name, def)?;
            }
            Ok(())
        }
        Definition::Schema(other) => {
            mount(schema, "", *other);
            Ok(())
        }
        _ => Err(ValidateError::Structural(
            "the root of a schema must be an object".into(),
        )),
    }
}

/// Reject a path that is empty or has an empty segment.
pub(crate) fn check_path(path: &str) -> FlattenResult<()> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(ValidateError::Structural(format!("bad path '{}'", path)));
    }
    Ok(())
}

/// Define `path` from a definition.
///
/// A rule for a validator the path already has replaces the earlier one.
pub(crate) fn define(schema: &mut Schema, path: &str, def: Definition) -> FlattenResult<()> {
    check_path(path)?;
    match def {
        Definition::Rules(rules) => apply_rules(schema, path, rules),
        Definition::Nested(fields) => {
            touch(schema, path).ty(Kind::Object.name());
            for (name, def) in fields {
                if name.is_empty() {
                    return Err(ValidateError::Structural(format!(
                        "empty field name under '{}'",
                        path
                    )));
                }
                define(schema, &join(path, &name), def)?;
            }
            Ok(())
        }
        Definition::Each(def) => define_each(schema, path, *def),
        Definition::Elements(defs) => define_elements(schema, path, defs),
        Definition::Schema(other) => {
            touch(schema, path).ty(Kind::Object.name());
            mount(schema, path, *other);
            Ok(())
        }
    }
}

/// Get or create the property at `path`.
///
/// Every parent path is created too, and the parent of a `$` segment is
/// typed as an array.
pub(crate) fn touch<'a>(schema: &'a mut Schema, path: &str) -> &'a mut Property {
    let (parent, last) = split_last(path);
    if !parent.is_empty() {
        let parent_prop = touch(schema, parent);
        if last == EACH {
            parent_prop.ty(Kind::Array.name());
        }
    }
    schema.paths.entry(path)
}

/// Declare that every element of the array at `path` follows `def`.
pub(crate) fn define_each(schema: &mut Schema, path: &str, def: Definition) -> FlattenResult<()> {
    touch(schema, path).ty(Kind::Array.name());
    define(schema, &join(path, EACH), def)
}

/// Declare one definition per array index at `path`.
pub(crate) fn define_elements(
    schema: &mut Schema,
    path: &str,
    defs: Vec<Definition>,
) -> FlattenResult<()> {
    touch(schema, path).ty(Kind::Array.name());
    for (i, def) in defs.into_iter().enumerate() {
        define(schema, &join(path, &i.to_string()), def)?;
    }
    Ok(())
}

fn apply_rules(schema: &mut Schema, path: &str, rules: Rules) -> FlattenResult<()> {
    touch(schema, path);
    for rule in rules.rules {
        let prop = schema.paths.entry(path);
        match rule {
            Rule::Required(b) => {
                prop.required(b);
            }
            Rule::Nonempty(b) => {
                prop.nonempty(b);
            }
            Rule::Type(t) => {
                prop.ty(&t);
            }
            Rule::Length(b) => {
                prop.length(b);
            }
            Rule::Size(b) => {
                prop.size(b);
            }
            Rule::Enum(values) => {
                prop.one_of(values);
            }
            Rule::Match(re) => {
                prop.matches(re);
            }
            Rule::Custom(name, arg) => {
                prop.rule(name, arg);
            }
            Rule::Use(name, func, Arg::None) => {
                prop.using(name, func);
            }
            Rule::Use(name, func, arg) => {
                prop.using_with(name, func, arg);
            }
            Rule::Message(Some(name), m) => {
                prop.message_for(name, m);
            }
            Rule::Message(None, m) => {
                prop.message(m);
            }
            Rule::Each(def) => define_each(schema, path, *def)?,
            Rule::Elements(defs) => define_elements(schema, path, defs)?,
        }
    }
    Ok(())
}

/// Mount a compiled schema under `path`.
///
/// Each of its properties is copied in, re-rooted under `path`.  Its tables
/// are merged in without replacing anything this schema already has.
pub(crate) fn mount(schema: &mut Schema, path: &str, other: Schema) {
    debug!("mounting {} paths under '{}'", other.paths.len(), path);
    schema.ctx.merge_missing(&other.ctx);
    for prop in other.paths.iter() {
        let full = join(path, prop.name());
        let target = touch(schema, &full);
        let mut copy = prop.clone();
        copy.rename(full);
        *target = copy;
    }
}
