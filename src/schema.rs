//! This module defines [`Schema`]: a flat set of properties keyed by path,
//! plus the validator, message, and typecaster tables they share.
//!
//! # Examples
//!
//! ```
//! use dotschema::{Definition, Rules, Schema, Value};
//!
//! let mut schema = Schema::from_definition(Definition::nested(vec![
//!     ("name", Rules::new().ty("string").required(true)),
//!     ("age", Rules::new().ty("number")),
//! ]))
//! .unwrap();
//!
//! let mut person = Value::Map(Default::default());
//! let errors = schema.validate(&mut person).unwrap();
//! assert_eq!(errors[0].message, "name is required.");
//!
//! schema.message("required", "missing!");
//! let errors = schema.validate(&mut person).unwrap();
//! assert_eq!(errors[0].message, "missing!");
//! ```

use crate::ast::Definition;
use crate::context::{BasicContext, Context, Message, TypecastFn, ValidatorFn};
use crate::flatten::{check_path, define, define_each, define_elements, flatten, touch};
use crate::path::{self, join, EACH};
use crate::property::{Arg, Bounds, Property};
use crate::util::{Mismatch, ValidateError, ValidateResult};
use crate::value::Value;
use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Validation options.
///
/// `typecast` casts each value to its declared type before checking it.
/// `strip` removes object fields that no declared path covers.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Cast values to their declared types first.  Off by default.
    pub typecast: bool,
    /// Remove undeclared fields first.  On by default.
    pub strip: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            typecast: false,
            strip: true,
        }
    }
}

impl Options {
    /// Apply per-call overrides to these options.
    pub fn merge(self, overrides: &Overrides) -> Options {
        Options {
            typecast: overrides.typecast.unwrap_or(self.typecast),
            strip: overrides.strip.unwrap_or(self.strip),
        }
    }
}

/// Per-call changes to a schema's [`Options`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct Overrides {
    pub typecast: Option<bool>,
    pub strip: Option<bool>,
}

/// Properties in declaration order, with lookup by path.
#[derive(Clone, Debug, Default)]
pub(crate) struct Paths {
    props: Vec<Property>,
    index: HashMap<String, usize>,
}

impl Paths {
    pub(crate) fn get(&self, name: &str) -> Option<&Property> {
        self.index.get(name).map(|&i| &self.props[i])
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get the property at `name`, creating an empty one if necessary.
    pub(crate) fn entry(&mut self, name: &str) -> &mut Property {
        let i = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.props.push(Property::new(name));
                let i = self.props.len() - 1;
                self.index.insert(name.to_string(), i);
                i
            }
        };
        &mut self.props[i]
    }

    /// `true` if some declared path lies beneath `prefix`.
    pub(crate) fn has_descendants(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return !self.props.is_empty();
        }
        self.props.iter().any(|p| {
            let name = p.name();
            name.len() > prefix.len()
                && name.starts_with(prefix)
                && name.as_bytes()[prefix.len()] == b'.'
        })
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.props.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.props.len()
    }
}

/// A compiled schema.
///
/// A Schema is usually built once and then only read.  Validation takes
/// `&self`, so one schema can serve many threads at a time; the builder
/// methods take `&mut self` and so can't run during a validation.
#[derive(Clone, Default)]
pub struct Schema {
    pub(crate) paths: Paths,
    pub(crate) ctx: BasicContext,
    options: Options,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.paths.iter().map(Property::name).collect();
        f.debug_struct("Schema")
            .field("paths", &names)
            .field("options", &self.options)
            .finish()
    }
}

impl Schema {
    /// Create an empty schema with the built-in tables.
    pub fn new() -> Schema {
        Schema::default()
    }

    /// Create an empty schema with the given default options.
    pub fn with_options(options: Options) -> Schema {
        Schema {
            options,
            ..Schema::default()
        }
    }

    /// Compile a schema from a definition.
    ///
    /// The root must be a [`Definition::Nested`] (or another schema).
    pub fn from_definition(def: Definition) -> Result<Schema, ValidateError> {
        let mut schema = Schema::new();
        schema.extend(def)?;
        Ok(schema)
    }

    /// Add the fields of a definition to this schema.
    pub fn extend(&mut self, def: Definition) -> ValidateResult {
        flatten(self, def)?;
        debug!("schema compiled with {} paths", self.paths.len());
        Ok(())
    }

    /// The default options.
    pub fn options(&self) -> Options {
        self.options
    }

    /// Change the default options.
    pub fn set_options(&mut self, options: Options) -> &mut Self {
        self.options = options;
        self
    }

    /// Get the builder for the property at `name`, creating it if necessary.
    ///
    /// Fails if `name` is empty or has an empty segment, as [`Schema::define`]
    /// does.
    pub fn path(&mut self, name: &str) -> Result<PathBuilder<'_>, ValidateError> {
        check_path(name)?;
        touch(self, name);
        Ok(PathBuilder {
            schema: self,
            name: name.to_string(),
        })
    }

    /// Define the property at `name` from a definition.
    pub fn define<D: Into<Definition>>(
        &mut self,
        name: &str,
        def: D,
    ) -> Result<PathBuilder<'_>, ValidateError> {
        define(self, name, def.into())?;
        Ok(PathBuilder {
            schema: self,
            name: name.to_string(),
        })
    }

    /// Look up a property without creating it.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.paths.get(name)
    }

    /// Iterate over the properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.paths.iter()
    }

    /// The shared tables.
    pub fn tables(&self) -> &BasicContext {
        &self.ctx
    }

    /// Set the message for a validator, for every property of this schema.
    ///
    /// The name `default` sets the message used when a validator has none.
    pub fn message<S: Into<String>, M: Into<Message>>(&mut self, name: S, message: M) -> &mut Self {
        self.ctx.messages.insert(name.into(), message.into());
        self
    }

    /// Set several messages at once.
    pub fn messages<I, S, M>(&mut self, messages: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, M)>,
        S: Into<String>,
        M: Into<Message>,
    {
        for (name, message) in messages {
            self.message(name, message);
        }
        self
    }

    /// Add or replace a validator, for every property of this schema.
    pub fn validator<S: Into<String>>(&mut self, name: S, func: ValidatorFn) -> &mut Self {
        self.ctx.validators.insert(name.into(), func);
        self
    }

    /// Add or replace several validators at once.
    pub fn validators<I, S>(&mut self, validators: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, ValidatorFn)>,
        S: Into<String>,
    {
        for (name, func) in validators {
            self.validator(name, func);
        }
        self
    }

    /// Add or replace the typecaster for a type name.
    pub fn typecaster<S: Into<String>>(&mut self, name: S, func: TypecastFn) -> &mut Self {
        self.ctx.typecasters.insert(name.into(), func);
        self
    }

    /// Add or replace several typecasters at once.
    pub fn typecasters<I, S>(&mut self, typecasters: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, TypecastFn)>,
        S: Into<String>,
    {
        for (name, func) in typecasters {
            self.typecaster(name, func);
        }
        self
    }

    /// Validate an object with the default options.
    ///
    /// See [`validate_with`](Self::validate_with).
    pub fn validate(&self, obj: &mut Value) -> Result<Vec<Mismatch>, ValidateError> {
        self.validate_with(obj, &Overrides::default())
    }

    /// Validate an object.
    ///
    /// If enabled, undeclared fields are stripped and values are typecast
    /// first; both modify `obj`.  Then every declared path is checked, and
    /// every failure is returned in declaration order.  An empty list means
    /// the object is valid.
    ///
    /// `Err` is returned only for a problem with the schema itself, such as
    /// a rule naming a validator that isn't registered.
    pub fn validate_with(
        &self,
        obj: &mut Value,
        overrides: &Overrides,
    ) -> Result<Vec<Mismatch>, ValidateError> {
        let options = self.options.merge(overrides);
        if options.strip {
            self.strip(obj);
        }
        if options.typecast {
            self.typecast(obj)?;
        }

        let obj: &Value = obj;
        let ctx = Context::new(&self.ctx, obj);
        let mut errors = Vec::new();
        for prop in self.paths.iter() {
            for concrete in path::expand(prop.name(), obj) {
                trace!("validating {}", concrete);
                match prop.validate_at(path::get(obj, &concrete), &ctx, &concrete) {
                    Ok(()) => {}
                    Err(ValidateError::Mismatch(m)) => errors.push(m),
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(errors)
    }

    /// Validate an object, returning it if it's valid.
    ///
    /// The first failure becomes the error.
    pub fn assert(&self, obj: Value) -> Result<Value, ValidateError> {
        self.assert_with(obj, &Overrides::default())
    }

    /// Validate an object with overrides, returning it if it's valid.
    pub fn assert_with(
        &self,
        mut obj: Value,
        overrides: &Overrides,
    ) -> Result<Value, ValidateError> {
        let errors = self.validate_with(&mut obj, overrides)?;
        match errors.into_iter().next() {
            Some(first) => Err(ValidateError::Mismatch(first)),
            None => Ok(obj),
        }
    }

    /// Remove every object field that no declared path covers.
    ///
    /// Array elements are never removed.  A value is only searched for
    /// undeclared fields if some declared path lies beneath it.
    pub fn strip(&self, obj: &mut Value) {
        let mut unknown = Vec::new();
        self.find_unknown(obj, "", "", &mut unknown);
        for concrete in unknown {
            debug!("stripping undeclared field {}", concrete);
            path::delete(obj, &concrete);
        }
    }

    fn find_unknown(
        &self,
        value: &Value,
        concrete: &str,
        pattern: &str,
        unknown: &mut Vec<String>,
    ) {
        match value {
            Value::Map(m) => {
                for (key, child) in m {
                    let child_pattern = join(pattern, key);
                    let child_concrete = join(concrete, key);
                    if !self.paths.contains(&child_pattern) {
                        unknown.push(child_concrete);
                    } else if self.paths.has_descendants(&child_pattern) {
                        self.find_unknown(child, &child_concrete, &child_pattern, unknown);
                    }
                }
            }
            Value::Array(a) => {
                for (i, child) in a.iter().enumerate() {
                    let index = i.to_string();
                    let by_index = join(pattern, &index);
                    let child_pattern = if self.paths.contains(&by_index) {
                        by_index
                    } else {
                        join(pattern, EACH)
                    };
                    if self.paths.has_descendants(&child_pattern) {
                        let child_concrete = join(concrete, &index);
                        self.find_unknown(child, &child_concrete, &child_pattern, unknown);
                    }
                }
            }
            _ => {}
        }
    }

    /// Cast every declared path that has a declared type.
    ///
    /// Missing and null values are left alone.
    pub fn typecast(&self, obj: &mut Value) -> ValidateResult {
        for prop in self.paths.iter() {
            if prop.declared_type().is_none() {
                continue;
            }
            for concrete in path::expand(prop.name(), obj) {
                let current = match path::get(obj, &concrete) {
                    Some(v) if !v.is_null() => v.clone(),
                    _ => continue,
                };
                let cast = prop.typecast(current.clone(), &self.ctx)?;
                if cast != current {
                    trace!("typecast {} from {} to {}", concrete, current.kind(), cast.kind());
                    path::set(obj, &concrete, cast);
                }
            }
        }
        Ok(())
    }
}

/// A fluent builder for one property of a schema.
///
/// Returned by [`Schema::path`] and [`Schema::define`].
pub struct PathBuilder<'a> {
    schema: &'a mut Schema,
    name: String,
}

impl<'a> PathBuilder<'a> {
    fn prop(&mut self) -> &mut Property {
        self.schema.paths.entry(&self.name)
    }

    /// The path being built.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property as built so far.
    pub fn property(&mut self) -> &Property {
        self.prop()
    }

    /// See [`Property::required`].
    pub fn required(mut self, required: bool) -> Self {
        self.prop().required(required);
        self
    }

    /// See [`Property::nonempty`].
    pub fn nonempty(mut self, nonempty: bool) -> Self {
        self.prop().nonempty(nonempty);
        self
    }

    /// See [`Property::ty`].
    pub fn ty(mut self, type_name: &str) -> Self {
        self.prop().ty(type_name);
        self
    }

    /// See [`Property::length`].
    pub fn length(mut self, bounds: Bounds) -> Self {
        self.prop().length(bounds);
        self
    }

    /// See [`Property::size`].
    pub fn size(mut self, bounds: Bounds) -> Self {
        self.prop().size(bounds);
        self
    }

    /// See [`Property::one_of`].
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.prop().one_of(values);
        self
    }

    /// See [`Property::matches`].
    pub fn matches(mut self, re: Regex) -> Self {
        self.prop().matches(re);
        self
    }

    /// See [`Property::using`].
    pub fn using<S: Into<String>>(mut self, name: S, func: ValidatorFn) -> Self {
        self.prop().using(name, func);
        self
    }

    /// See [`Property::using_with`].
    pub fn using_with<S: Into<String>>(mut self, name: S, func: ValidatorFn, arg: Arg) -> Self {
        self.prop().using_with(name, func, arg);
        self
    }

    /// See [`Property::rule`].
    pub fn rule<S: Into<String>>(mut self, name: S, arg: Arg) -> Self {
        self.prop().rule(name, arg);
        self
    }

    /// See [`Property::message`].
    pub fn message<M: Into<Message>>(mut self, message: M) -> Self {
        self.prop().message(message);
        self
    }

    /// See [`Property::message_for`].
    pub fn message_for<S: Into<String>, M: Into<Message>>(mut self, name: S, message: M) -> Self {
        self.prop().message_for(name, message);
        self
    }

    /// Every element of the array at this path follows `def`.
    ///
    /// This defines the path `<name>.$` on the schema.
    pub fn each<D: Into<Definition>>(self, def: D) -> Result<Self, ValidateError> {
        define_each(self.schema, &self.name, def.into())?;
        Ok(self)
    }

    /// The elements of the array at this path follow one definition per
    /// index, defined as `<name>.0`, `<name>.1`, and so on.
    pub fn elements<I, D>(self, defs: I) -> Result<Self, ValidateError>
    where
        I: IntoIterator<Item = D>,
        D: Into<Definition>,
    {
        let defs = defs.into_iter().map(Into::into).collect();
        define_elements(self.schema, &self.name, defs)?;
        Ok(self)
    }
}
