//! This module defines the schema definition literal.
//!
//! A [`Definition`] is the uncompiled form of a schema: a tree that closely
//! matches the way a schema is written down, whether by hand in Rust or as
//! a JSON literal (see [`parser`](crate::parser)).  A [`Schema`] compiles it
//! into a flat mapping from path to [`Property`](crate::property::Property).
//!

use crate::context::{Message, ValidatorFn};
use crate::property::{Arg, Bounds};
use crate::schema::Schema;
use crate::value::Value;
use regex::Regex;
use std::fmt;

/// One node of a schema definition.
#[derive(Clone, Debug)]
pub enum Definition {
    /// The rules for a single path.
    Rules(Rules),
    /// A nested object: each field is defined under this path.
    Nested(Vec<(String, Definition)>),
    /// An array whose every element follows one definition (`[rule]`).
    Each(Box<Definition>),
    /// An array whose elements follow one definition per index (`[a, b]`).
    Elements(Vec<Definition>),
    /// A compiled schema, mounted under this path.
    Schema(Box<Schema>),
}

impl Definition {
    /// A nested object definition.
    pub fn nested<I, K, D>(fields: I) -> Definition
    where
        I: IntoIterator<Item = (K, D)>,
        K: Into<String>,
        D: Into<Definition>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, d)| (k.into(), d.into()))
            .collect();
        Definition::Nested(fields)
    }

    /// An array whose elements all follow `def`.
    pub fn each<D: Into<Definition>>(def: D) -> Definition {
        Definition::Each(Box::new(def.into()))
    }

    /// An array with one definition per index.
    pub fn elements<I, D>(defs: I) -> Definition
    where
        I: IntoIterator<Item = D>,
        D: Into<Definition>,
    {
        Definition::Elements(defs.into_iter().map(Into::into).collect())
    }
}

impl From<Rules> for Definition {
    fn from(rules: Rules) -> Definition {
        Definition::Rules(rules)
    }
}

impl From<Schema> for Definition {
    fn from(schema: Schema) -> Definition {
        Definition::Schema(Box::new(schema))
    }
}

/// A bare type name is shorthand for `Rules::new().ty(name)`.
impl From<&str> for Definition {
    fn from(type_name: &str) -> Definition {
        Definition::Rules(Rules::new().ty(type_name))
    }
}

/// A single rule, as written in a definition.
#[derive(Clone)]
#[allow(missing_docs)]
pub enum Rule {
    Required(bool),
    Nonempty(bool),
    Type(String),
    Length(Bounds),
    Size(Bounds),
    Enum(Vec<Value>),
    Match(Regex),
    /// A schema-level validator, by name.
    Custom(String, Arg),
    /// A validator function local to this path.
    Use(String, ValidatorFn, Arg),
    /// A message for one validator, or for the whole path if unnamed.
    Message(Option<String>, Message),
    Each(Box<Definition>),
    Elements(Vec<Definition>),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required(b) => write!(f, "Required({})", b),
            Rule::Nonempty(b) => write!(f, "Nonempty({})", b),
            Rule::Type(t) => write!(f, "Type({})", t),
            Rule::Length(b) => write!(f, "Length({:?})", b),
            Rule::Size(b) => write!(f, "Size({:?})", b),
            Rule::Enum(v) => write!(f, "Enum({:?})", v),
            Rule::Match(re) => write!(f, "Match(/{}/)", re.as_str()),
            Rule::Custom(name, arg) => write!(f, "Custom({}, {:?})", name, arg),
            Rule::Use(name, _, arg) => write!(f, "Use({}, {:?})", name, arg),
            Rule::Message(name, m) => write!(f, "Message({:?}, {:?})", name, m),
            Rule::Each(d) => write!(f, "Each({:?})", d),
            Rule::Elements(d) => write!(f, "Elements({:?})", d),
        }
    }
}

/// The flat rule set for one path.
///
/// Rules keep the order they were added in; that's the order the
/// validators run in, after `required` and `type`.
#[derive(Clone, Debug, Default)]
pub struct Rules {
    /// The rules, in order.
    pub rules: Vec<Rule>,
}

impl Rules {
    /// An empty rule set.
    pub fn new() -> Rules {
        Rules::default()
    }

    /// Add any rule.
    pub fn with(mut self, rule: Rule) -> Rules {
        self.rules.push(rule);
        self
    }

    /// See [`Property::required`](crate::property::Property::required).
    pub fn required(self, required: bool) -> Rules {
        self.with(Rule::Required(required))
    }

    /// See [`Property::nonempty`](crate::property::Property::nonempty).
    pub fn nonempty(self, nonempty: bool) -> Rules {
        self.with(Rule::Nonempty(nonempty))
    }

    /// See [`Property::ty`](crate::property::Property::ty).
    pub fn ty(self, type_name: &str) -> Rules {
        self.with(Rule::Type(type_name.to_string()))
    }

    /// See [`Property::length`](crate::property::Property::length).
    pub fn length(self, bounds: Bounds) -> Rules {
        self.with(Rule::Length(bounds))
    }

    /// See [`Property::size`](crate::property::Property::size).
    pub fn size(self, bounds: Bounds) -> Rules {
        self.with(Rule::Size(bounds))
    }

    /// See [`Property::one_of`](crate::property::Property::one_of).
    pub fn one_of<I, V>(self, values: I) -> Rules
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with(Rule::Enum(values.into_iter().map(Into::into).collect()))
    }

    /// See [`Property::matches`](crate::property::Property::matches).
    pub fn matches(self, re: Regex) -> Rules {
        self.with(Rule::Match(re))
    }

    /// See [`Property::rule`](crate::property::Property::rule).
    pub fn rule<S: Into<String>>(self, name: S, arg: Arg) -> Rules {
        self.with(Rule::Custom(name.into(), arg))
    }

    /// See [`Property::using`](crate::property::Property::using).
    pub fn using<S: Into<String>>(self, name: S, func: ValidatorFn) -> Rules {
        self.with(Rule::Use(name.into(), func, Arg::None))
    }

    /// See [`Property::message`](crate::property::Property::message).
    pub fn message<M: Into<Message>>(self, message: M) -> Rules {
        self.with(Rule::Message(None, message.into()))
    }

    /// See [`Property::message_for`](crate::property::Property::message_for).
    pub fn message_for<S: Into<String>, M: Into<Message>>(self, name: S, message: M) -> Rules {
        self.with(Rule::Message(Some(name.into()), message.into()))
    }

    /// Elements of the array at this path follow `def`.
    pub fn each<D: Into<Definition>>(self, def: D) -> Rules {
        self.with(Rule::Each(Box::new(def.into())))
    }

    /// Elements of the array at this path follow one definition per index.
    pub fn elements<I, D>(self, defs: I) -> Rules
    where
        I: IntoIterator<Item = D>,
        D: Into<Definition>,
    {
        self.with(Rule::Elements(defs.into_iter().map(Into::into).collect()))
    }
}
