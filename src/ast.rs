//! Parsed build-language structures.
//!
//! This module defines the data structures produced by the manifest parser:
//! a [`RuleInvocation`] per top-level rule call, holding positional
//! arguments and an insertion-ordered keyword attribute map of [`Value`]s.
//! Invocations are immutable once parsed; all interpretation happens in the
//! dispatch layer.

use indexmap::IndexMap;

/// An attribute value in a rule call.
///
/// The build language is restricted: values are strings, integers,
/// booleans, or lists thereof. Constructs the translation has no use for
/// (dict literals, `glob`/`select` calls, references to injected variables)
/// are evaluated to an empty [`Value::List`] during parsing, mirroring the
/// source system's tolerance of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A string literal, with escapes resolved.
    Str(String),
    /// An integer literal.
    Int(i64),
    /// A boolean literal (`True` or `False`).
    Bool(bool),
    /// A list of values. Nested lists flatten when read as strings.
    List(Vec<Value>),
}

impl Value {
    /// Interpret the value as a boolean marker.
    ///
    /// Non-boolean values follow truthiness: non-empty strings, non-zero
    /// integers, and non-empty lists are true.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::Int(n) => *n != 0,
            Self::Bool(b) => *b,
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Collect every string reachable from this value, in order.
    ///
    /// Non-string scalars are skipped; lists are flattened.
    pub fn collect_strings(&self, out: &mut Vec<String>) {
        match self {
            Self::Str(s) => out.push(s.clone()),
            Self::List(items) => {
                for item in items {
                    item.collect_strings(out);
                }
            }
            Self::Int(_) | Self::Bool(_) => {}
        }
    }
}

/// One top-level rule call parsed from a build file.
///
/// `rule` is the callee name as written. Keyword arguments preserve their
/// declaration order so that emitted output is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInvocation {
    /// The rule name as written at the call site.
    pub rule: String,
    /// Positional arguments, in order.
    pub args: Vec<Value>,
    /// Keyword arguments, in declaration order.
    pub attrs: IndexMap<String, Value>,
}

impl RuleInvocation {
    /// The `name` attribute, when present and a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.attrs.get("name") {
            Some(Value::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The named attribute as a string, when present.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<&str> {
        match self.attrs.get(key) {
            Some(Value::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The named attribute flattened to a list of strings.
    ///
    /// Absent attributes yield an empty list, matching the source system's
    /// `kwargs.get(key, [])` convention.
    #[must_use]
    pub fn strings(&self, key: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(value) = self.attrs.get(key) {
            value.collect_strings(&mut out);
        }
        out
    }

    /// Whether the named attribute is present and truthy.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.attrs.get(key).is_some_and(Value::truthy)
    }
}
