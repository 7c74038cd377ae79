//! This module defines [`Property`]: the compiled rules for one schema path.
//!
//! A Property holds an ordered registry of validator bindings.  Each binding
//! names a validator, carries the argument it was registered with, and may
//! carry its own function that overrides the schema-level validator of the
//! same name for this property only.

use crate::context::{Context, LookupContext, Message, ValidatorFn};
use crate::util::{mismatch, ValidateError, ValidateResult};
use crate::value::Value;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

pub(crate) const REQUIRED: &str = "required";
pub(crate) const NONEMPTY: &str = "nonempty";
pub(crate) const TYPE: &str = "type";
pub(crate) const LENGTH: &str = "length";
pub(crate) const SIZE: &str = "size";
pub(crate) const ENUM: &str = "enum";
pub(crate) const MATCH: &str = "match";
pub(crate) const DEFAULT: &str = "default";

/// Lower and upper limits, both inclusive and both optional.
///
/// Used as a length limit by `length` and as a numeric limit by `size`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[allow(missing_docs)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    /// Exactly `n`.
    pub fn exact(n: f64) -> Bounds {
        Bounds {
            min: Some(n),
            max: Some(n),
        }
    }

    /// At least `n`.
    pub fn min(n: f64) -> Bounds {
        Bounds {
            min: Some(n),
            max: None,
        }
    }

    /// At most `n`.
    pub fn max(n: f64) -> Bounds {
        Bounds {
            min: None,
            max: Some(n),
        }
    }

    /// Between `min` and `max`.
    pub fn between(min: f64, max: f64) -> Bounds {
        Bounds {
            min: Some(min),
            max: Some(max),
        }
    }

    /// `true` if `x` is within the limits.
    pub fn contains(&self, x: f64) -> bool {
        self.min.map_or(true, |min| x >= min) && self.max.map_or(true, |max| x <= max)
    }
}

/// The argument a validator was registered with.
#[derive(Debug, Clone)]
pub enum Arg {
    /// No argument.
    None,
    /// An on/off switch, e.g. `required(false)`.
    Flag(bool),
    /// A name, e.g. the type name given to `ty()`.
    Name(String),
    /// Limits for `length` or `size`.
    Bounds(Bounds),
    /// The allowed values for `enum`.
    Values(Vec<Value>),
    /// The pattern for `match`.
    Pattern(Regex),
    /// Any other value, for custom validators.
    Value(Value),
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::None, Arg::None) => true,
            (Arg::Flag(a), Arg::Flag(b)) => a == b,
            (Arg::Name(a), Arg::Name(b)) => a == b,
            (Arg::Bounds(a), Arg::Bounds(b)) => a == b,
            (Arg::Values(a), Arg::Values(b)) => a == b,
            // We only need to compare the string form,
            // not the compiled form.
            (Arg::Pattern(a), Arg::Pattern(b)) => a.as_str() == b.as_str(),
            (Arg::Value(a), Arg::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::None => Ok(()),
            Arg::Flag(b) => write!(f, "{}", b),
            Arg::Name(s) => f.write_str(s),
            Arg::Bounds(b) => {
                if let Some(min) = b.min {
                    write!(f, "{}", Value::Number(min))?;
                }
                f.write_str("..")?;
                if let Some(max) = b.max {
                    write!(f, "{}", Value::Number(max))?;
                }
                Ok(())
            }
            Arg::Values(v) => {
                let names: Vec<String> = v.iter().map(Value::to_string).collect();
                f.write_str(&names.join(", "))
            }
            Arg::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Arg::Value(v) => write!(f, "{}", v),
        }
    }
}

/// One entry in a property's registry.
#[derive(Clone)]
pub struct Binding {
    /// The argument passed to the validator.
    pub arg: Arg,
    /// A property-local validator, used instead of the schema's.
    pub func: Option<ValidatorFn>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("arg", &self.arg)
            .field("local", &self.func.is_some())
            .finish()
    }
}

/// The compiled validation rules bound to one path.
#[derive(Clone, Debug)]
pub struct Property {
    name: String,
    registry: Vec<(String, Binding)>,
    declared_type: Option<String>,
    messages: HashMap<String, Message>,
}

impl Property {
    /// Create a Property with no rules.
    pub fn new<S: Into<String>>(name: S) -> Property {
        Property {
            name: name.into(),
            registry: Vec::new(),
            declared_type: None,
            messages: HashMap::new(),
        }
    }

    /// The path this property validates, e.g. `author.posts.$.title`.
    pub fn name(&self) -> &str {
        &self.name
    }

    // Used when a property is mounted under another path.
    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    /// The type given to [`ty`](Self::ty), if any.
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    /// Look up a binding by validator name.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.registry
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, binding)| binding)
    }

    /// The validator names in registration order.
    pub fn validator_names(&self) -> impl Iterator<Item = &str> {
        self.registry.iter().map(|(n, _)| n.as_str())
    }

    /// Register a validator by name.
    ///
    /// Registering a name twice replaces the earlier binding but keeps its
    /// position.  Without `func`, the schema's validator of that name runs.
    pub fn register<S: Into<String>>(
        &mut self,
        name: S,
        arg: Arg,
        func: Option<ValidatorFn>,
    ) -> &mut Self {
        let name = name.into();
        let binding = Binding { arg, func };
        match self.registry.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = binding,
            None => self.registry.push((name, binding)),
        }
        self
    }

    /// Require a value.  `required(false)` registers a check that always passes.
    pub fn required(&mut self, required: bool) -> &mut Self {
        self.register(REQUIRED, Arg::Flag(required), None)
    }

    /// Require a string or array to have at least one element.
    pub fn nonempty(&mut self, nonempty: bool) -> &mut Self {
        self.register(NONEMPTY, Arg::Flag(nonempty), None)
    }

    /// Require a type, and remember it as the typecast target.
    ///
    /// Type names are case-insensitive: `"Number"` and `"number"` are the same.
    pub fn ty(&mut self, name: &str) -> &mut Self {
        let name = name.to_ascii_lowercase();
        self.declared_type = Some(name.clone());
        self.register(TYPE, Arg::Name(name), None)
    }

    /// Limit the length of a string or array.
    pub fn length(&mut self, bounds: Bounds) -> &mut Self {
        self.register(LENGTH, Arg::Bounds(bounds), None)
    }

    /// Limit the value of a number.
    pub fn size(&mut self, bounds: Bounds) -> &mut Self {
        self.register(SIZE, Arg::Bounds(bounds), None)
    }

    /// Require the value to be one of `values`.
    pub fn one_of<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.register(ENUM, Arg::Values(values), None)
    }

    /// Require the value to match a regular expression.
    pub fn matches(&mut self, re: Regex) -> &mut Self {
        self.register(MATCH, Arg::Pattern(re), None)
    }

    /// Register a custom validator for this property only.
    pub fn using<S: Into<String>>(&mut self, name: S, func: ValidatorFn) -> &mut Self {
        self.register(name, Arg::None, Some(func))
    }

    /// Register a custom validator, with an argument, for this property only.
    pub fn using_with<S: Into<String>>(
        &mut self,
        name: S,
        func: ValidatorFn,
        arg: Arg,
    ) -> &mut Self {
        self.register(name, arg, Some(func))
    }

    /// Register a schema-level validator by name.
    pub fn rule<S: Into<String>>(&mut self, name: S, arg: Arg) -> &mut Self {
        self.register(name, arg, None)
    }

    /// Set the message for every failure of this property.
    pub fn message<M: Into<Message>>(&mut self, message: M) -> &mut Self {
        self.messages.insert(DEFAULT.to_string(), message.into());
        self
    }

    /// Set the message for failures of one validator on this property.
    pub fn message_for<S: Into<String>, M: Into<Message>>(
        &mut self,
        name: S,
        message: M,
    ) -> &mut Self {
        self.messages.insert(name.into(), message.into());
        self
    }

    /// Cast a value to the declared type.
    ///
    /// Without a declared type the value is returned unchanged: the target
    /// type is never inferred.
    pub fn typecast(
        &self,
        value: Value,
        lookup: &dyn LookupContext,
    ) -> Result<Value, ValidateError> {
        match &self.declared_type {
            Some(ty) => {
                let cast = lookup.lookup_typecaster(ty)?;
                Ok(cast(value))
            }
            None => Ok(value),
        }
    }

    /// Validate a value at this property's own path.
    pub fn validate(&self, value: Option<&Value>, ctx: &Context) -> ValidateResult {
        self.validate_at(value, ctx, &self.name)
    }

    /// Validate a value, reporting failures against `path`.
    ///
    /// `required` runs first; if it passes and the value is absent or null,
    /// nothing else runs.  Then `type`, then every other validator in
    /// registration order.  The first failure is returned.
    pub fn validate_at(&self, value: Option<&Value>, ctx: &Context, path: &str) -> ValidateResult {
        self.run(REQUIRED, value, ctx, path)?;

        if value.map_or(true, Value::is_null) {
            return Ok(());
        }

        self.run(TYPE, value, ctx, path)?;

        for (name, binding) in &self.registry {
            if name == REQUIRED || name == TYPE {
                continue;
            }
            self.check(name, binding, value, ctx, path)?;
        }
        Ok(())
    }

    fn run(&self, name: &str, value: Option<&Value>, ctx: &Context, path: &str) -> ValidateResult {
        match self.binding(name) {
            Some(binding) => self.check(name, binding, value, ctx, path),
            None => Ok(()),
        }
    }

    fn check(
        &self,
        name: &str,
        binding: &Binding,
        value: Option<&Value>,
        ctx: &Context,
        path: &str,
    ) -> ValidateResult {
        let func = match &binding.func {
            Some(f) => f,
            None => ctx.lookup().lookup_validator(name)?,
        };
        if func(value, ctx, &binding.arg) {
            Ok(())
        } else {
            let message = self.render(name, path, &binding.arg, ctx);
            Err(mismatch(path, message))
        }
    }

    // Message lookup order: this property's message for the validator, this
    // property's default, the schema's message for the validator, the
    // schema's default.
    fn render(&self, name: &str, path: &str, arg: &Arg, ctx: &Context) -> String {
        let lookup = ctx.lookup();
        let message = self
            .messages
            .get(name)
            .or_else(|| self.messages.get(DEFAULT))
            .or_else(|| lookup.lookup_message(name))
            .or_else(|| lookup.lookup_message(DEFAULT));
        match message {
            Some(m) => m.render(path, arg),
            None => format!("Validation failed for {}.", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::DummyContext;
    use crate::context::{validator, BasicContext};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn check(prop: &Property, value: Option<&Value>) -> ValidateResult {
        let tables = BasicContext::default();
        let root = Value::Null;
        let ctx = Context::new(&tables, &root);
        prop.validate(value, &ctx)
    }

    fn message(result: ValidateResult) -> String {
        match result {
            Err(ValidateError::Mismatch(m)) => m.message,
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn required_comes_first() {
        let mut prop = Property::new("name");
        prop.length(Bounds::min(3.0)).ty("string").required(true);
        assert_eq!(message(check(&prop, None)), "name is required.");
        assert_eq!(
            message(check(&prop, Some(&Value::from(3)))),
            "name must be of type string."
        );
        assert_eq!(
            message(check(&prop, Some(&Value::from("ab")))),
            "name must have a minimum length of 3."
        );
        check(&prop, Some(&Value::from("abc"))).unwrap();
    }

    #[test]
    fn optional_null_short_circuits() {
        let mut prop = Property::new("name");
        prop.required(false)
            .ty("string")
            .length(Bounds::min(3.0))
            .one_of(vec!["abc"])
            .matches(Regex::new("^x").unwrap());
        check(&prop, None).unwrap();
        check(&prop, Some(&Value::Null)).unwrap();
    }

    #[test]
    fn each_validator_runs_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let mut prop = Property::new("x");
        prop.using(
            "type",
            validator(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );
        prop.required(true);
        check(&prop, Some(&Value::from(1))).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn first_failure_wins() {
        let mut prop = Property::new("code");
        prop.length(Bounds::max(2.0)).matches(Regex::new("^[0-9]+$").unwrap());
        assert_eq!(
            message(check(&prop, Some(&Value::from("abc")))),
            "code must have a maximum length of 2."
        );
    }

    #[test]
    fn reregister_replaces() {
        let mut prop = Property::new("a");
        prop.length(Bounds::min(1.0)).required(true).length(Bounds::min(5.0));
        let names: Vec<&str> = prop.validator_names().collect();
        assert_eq!(names, vec!["length", "required"]);
        assert_eq!(
            prop.binding("length").unwrap().arg,
            Arg::Bounds(Bounds::min(5.0))
        );
    }

    #[test]
    fn property_messages() {
        let mut prop = Property::new("age");
        prop.ty("number").required(true).message_for("required", "need an age");
        assert_eq!(message(check(&prop, None)), "need an age");
        prop.message("bad age");
        assert_eq!(message(check(&prop, Some(&Value::from("x")))), "bad age");
    }

    #[test]
    fn unknown_validator_is_fatal() {
        let mut prop = Property::new("a");
        prop.rule("hex", Arg::None);
        let err = check(&prop, Some(&Value::from("ff"))).unwrap_err();
        assert_eq!(err, ValidateError::MissingValidator("hex".into()));
        assert!(err.is_fatal());
    }

    #[test]
    fn dummy_context() {
        let mut prop = Property::new("a");
        prop.required(true);
        let lookup = DummyContext::new();
        let root = Value::Null;
        let ctx = Context::new(&lookup, &root);
        assert!(prop.validate(Some(&Value::from(1)), &ctx).unwrap_err().is_fatal());
        // With no rules, nothing is looked up.
        Property::new("b").validate(None, &ctx).unwrap();
    }

    #[test]
    fn typecast_needs_declared_type() {
        let tables = BasicContext::default();
        let prop = Property::new("a");
        assert_eq!(prop.typecast(Value::from("1"), &tables).unwrap(), Value::from("1"));
        let mut prop = Property::new("a");
        prop.ty("Number");
        assert_eq!(prop.declared_type(), Some("number"));
        assert_eq!(prop.typecast(Value::from("1"), &tables).unwrap(), Value::from(1));
        let mut prop = Property::new("a");
        prop.ty("uuid");
        assert_eq!(
            prop.typecast(Value::from("1"), &tables).unwrap_err(),
            ValidateError::MissingTypecaster("uuid".into())
        );
    }
}
