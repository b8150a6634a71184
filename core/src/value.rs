//! Typed parameter values and the ordered pair lists built from them.
//!
//! # Design
//! Query, header and form-body parameters all carry a `TypedValue` so callers
//! can pass integers and booleans without formatting them first. Rendering to
//! text happens once, in `TypedValue::serialize`, when the request is
//! materialized.
//!
//! `ParameterSet` is an ordered list rather than a map: duplicate keys are
//! meaningful for queries and form bodies and must survive in insertion order.

use std::fmt;

/// A single parameter value. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl TypedValue {
    /// Canonical text form: strings verbatim, integers in decimal, booleans
    /// as `true` / `false`.
    pub fn serialize(&self) -> String {
        match self {
            TypedValue::String(s) => s.clone(),
            TypedValue::Int(i) => i.to_string(),
            TypedValue::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::String(value.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        TypedValue::String(value)
    }
}

impl From<i64> for TypedValue {
    fn from(value: i64) -> Self {
        TypedValue::Int(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Bool(value)
    }
}

/// A key with its typed value. Keys are passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: TypedValue,
}

/// Ordered, duplicate-preserving list of parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    pairs: Vec<KeyValuePair>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<TypedValue>) {
        self.pairs.push(KeyValuePair {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValuePair> {
        self.pairs.iter()
    }

    /// Pairs rendered to `(key, text)` in insertion order.
    pub fn serialized(&self) -> impl Iterator<Item = (&str, String)> {
        self.pairs
            .iter()
            .map(|pair| (pair.key.as_str(), pair.value.serialize()))
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a KeyValuePair;
    type IntoIter = std::slice::Iter<'a, KeyValuePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
