//! This module defines the tables shared by every property of a schema, and
//! the [`Context`] handed to validators.
//!
//! A schema owns one [`BasicContext`]: the validator, message, and typecaster
//! tables.  Properties never copy these tables.  They look entries up by name
//! through the [`LookupContext`] trait each time they run, so replacing a
//! table entry after properties exist changes how all of them behave.
//!

use crate::property::Arg;
use crate::typecast;
use crate::util::ValidateError;
use crate::validate::{builtin_messages, builtin_validators};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A validator answers whether a value satisfies one rule.
///
/// It receives the value (`None` if the field is absent), the validation
/// [`Context`], and the argument the rule was registered with.
pub type ValidatorFn = Arc<dyn Fn(Option<&Value>, &Context<'_>, &Arg) -> bool + Send + Sync>;

/// A message template: renders a failure message from `(path, arg)`.
pub type TemplateFn = Arc<dyn Fn(&str, &Arg) -> String + Send + Sync>;

/// A typecaster converts a value into one type, or returns it unchanged.
pub type TypecastFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Wrap a closure as a [`ValidatorFn`].
pub fn validator<F>(f: F) -> ValidatorFn
where
    F: Fn(Option<&Value>, &Context<'_>, &Arg) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a [`TypecastFn`].
pub fn typecaster<F>(f: F) -> TypecastFn
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The message reported when a validator fails.
#[derive(Clone)]
pub enum Message {
    /// A fixed string.
    Text(String),
    /// A function of the failing path and the rule's argument.
    Template(TemplateFn),
}

impl Message {
    /// Build a message from a template function.
    pub fn template<F>(f: F) -> Message
    where
        F: Fn(&str, &Arg) -> String + Send + Sync + 'static,
    {
        Message::Template(Arc::new(f))
    }

    /// Produce the final message text.
    pub fn render(&self, path: &str, arg: &Arg) -> String {
        match self {
            Message::Text(s) => s.clone(),
            Message::Template(f) => f(path, arg),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Message::Template(_) => f.write_str("Template"),
        }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Message {
        Message::Text(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Message {
        Message::Text(s)
    }
}

/// Name lookups performed while validating.
pub trait LookupContext {
    /// Lookup a validator by name.
    fn lookup_validator(&self, name: &str) -> Result<&ValidatorFn, ValidateError>;
    /// Lookup a message template by validator name.
    fn lookup_message(&self, name: &str) -> Option<&Message>;
    /// Lookup a typecaster by type name.
    fn lookup_typecaster(&self, name: &str) -> Result<&TypecastFn, ValidateError>;
}

/// The validator, message, and typecaster tables of a schema.
///
/// `BasicContext::default()` is seeded with the built-in entries.
#[derive(Clone)]
#[allow(missing_docs)]
pub struct BasicContext {
    pub validators: HashMap<String, ValidatorFn>,
    pub messages: HashMap<String, Message>,
    pub typecasters: HashMap<String, TypecastFn>,
}

impl BasicContext {
    /// Create a context with no entries at all.
    pub fn empty() -> BasicContext {
        BasicContext {
            validators: HashMap::new(),
            messages: HashMap::new(),
            typecasters: HashMap::new(),
        }
    }

    /// Copy in every entry of `other` whose name isn't present here.
    pub fn merge_missing(&mut self, other: &BasicContext) {
        for (name, f) in &other.validators {
            self.validators.entry(name.clone()).or_insert_with(|| f.clone());
        }
        for (name, m) in &other.messages {
            self.messages.entry(name.clone()).or_insert_with(|| m.clone());
        }
        for (name, f) in &other.typecasters {
            self.typecasters.entry(name.clone()).or_insert_with(|| f.clone());
        }
    }
}

impl Default for BasicContext {
    fn default() -> Self {
        let mut typecasters: HashMap<String, TypecastFn> = HashMap::new();
        for (kind, cast) in typecast::builtin_typecasters() {
            typecasters.insert(kind.name().to_string(), typecaster(cast));
        }
        BasicContext {
            validators: builtin_validators(),
            messages: builtin_messages(),
            typecasters,
        }
    }
}

impl fmt::Debug for BasicContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut validators: Vec<&String> = self.validators.keys().collect();
        validators.sort();
        let mut typecasters: Vec<&String> = self.typecasters.keys().collect();
        typecasters.sort();
        f.debug_struct("BasicContext")
            .field("validators", &validators)
            .field("typecasters", &typecasters)
            .finish()
    }
}

impl LookupContext for BasicContext {
    fn lookup_validator(&self, name: &str) -> Result<&ValidatorFn, ValidateError> {
        self.validators
            .get(name)
            .ok_or_else(|| ValidateError::MissingValidator(name.to_string()))
    }

    fn lookup_message(&self, name: &str) -> Option<&Message> {
        self.messages.get(name)
    }

    fn lookup_typecaster(&self, name: &str) -> Result<&TypecastFn, ValidateError> {
        self.typecasters
            .get(name)
            .ok_or_else(|| ValidateError::MissingTypecaster(name.to_string()))
    }
}

/// Everything a validator can see besides its own value and argument.
///
/// The root is the whole object being validated, so a validator can compare
/// a field against its siblings.
pub struct Context<'a> {
    lookup: &'a dyn LookupContext,
    root: &'a Value,
}

impl<'a> Context<'a> {
    /// Create a new Context.
    pub fn new(lookup: &'a dyn LookupContext, root: &'a Value) -> Context<'a> {
        Context { lookup, root }
    }

    /// The object being validated.
    pub fn root(&self) -> &'a Value {
        self.root
    }

    /// Read another field of the object being validated.
    pub fn get(&self, path: &str) -> Option<&'a Value> {
        crate::path::get(self.root, path)
    }

    /// The tables used for name lookups.
    pub fn lookup(&self) -> &'a dyn LookupContext {
        self.lookup
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("root", &self.root).finish()
    }
}

#[doc(hidden)] // Only pub for integration tests
#[allow(missing_docs)]
pub mod tests {
    use super::{LookupContext, Message, TypecastFn, ValidateError, ValidatorFn};

    /// A [LookupContext] that fails all lookups
    pub struct DummyContext {}

    impl DummyContext {
        #![allow(clippy::new_without_default)]
        pub fn new() -> DummyContext {
            DummyContext {}
        }
    }

    impl LookupContext for DummyContext {
        fn lookup_validator(&self, name: &str) -> Result<&ValidatorFn, ValidateError> {
            Err(ValidateError::MissingValidator(name.to_string()))
        }

        fn lookup_message(&self, _name: &str) -> Option<&Message> {
            None
        }

        fn lookup_typecaster(&self, name: &str) -> Result<&TypecastFn, ValidateError> {
            Err(ValidateError::MissingTypecaster(name.to_string()))
        }
    }
}
