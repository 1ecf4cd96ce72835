//! Local variables visible to selectors during an evaluation.
//!
//! Collection expressions push bindings for the element they are visiting
//! and truncate them again afterwards, so the stack only ever grows and
//! shrinks at the end. Lookups run from the most recent binding backwards.

use std::fmt;

use crate::error::Error;
use crate::value::Value;

/// What a local variable stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Selector prefix substituted for the variable name
    Alias(Vec<String>),

    /// Fixed value; cannot be navigated further
    Value(Value),
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Alias(path) => write!(f, "path {:?}", path.join(".")),
            Binding::Value(value) => write!(f, "{} value", value.kind()),
        }
    }
}

/// A named binding.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    name: String,
    binding: Binding,
}

impl LocalVariable {
    pub fn alias(name: impl Into<String>, path: Vec<String>) -> Self {
        LocalVariable {
            name: name.into(),
            binding: Binding::Alias(path),
        }
    }

    pub fn value(name: impl Into<String>, value: Value) -> Self {
        LocalVariable {
            name: name.into(),
            binding: Binding::Value(value),
        }
    }

    /// Builds a variable from an optional path and an optional value.
    /// Exactly one of them must be given.
    pub fn try_new(
        name: impl Into<String>,
        path: Option<Vec<String>>,
        value: Option<Value>,
    ) -> Result<Self, Error> {
        let name = name.into();
        match (path, value) {
            (Some(path), None) => Ok(LocalVariable::alias(name, path)),
            (None, Some(value)) => Ok(LocalVariable::value(name, value)),
            (Some(_), Some(_)) => Err(Error::InvalidOption(format!(
                "local variable '{}' cannot have both a path and a value",
                name
            ))),
            (None, None) => Err(Error::InvalidOption(format!(
                "local variable '{}' needs a path or a value",
                name
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }
}

/// Bindings in scope for one evaluation.
#[derive(Debug, Clone, Default)]
pub(crate) struct LocalStack {
    vars: Vec<LocalVariable>,
}

impl LocalStack {
    pub(crate) fn new(seed: &[LocalVariable]) -> Self {
        LocalStack { vars: seed.to_vec() }
    }

    pub(crate) fn len(&self) -> usize {
        self.vars.len()
    }

    pub(crate) fn push(&mut self, var: LocalVariable) {
        self.vars.push(var);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.vars.truncate(len);
    }

    pub(crate) fn as_slice(&self) -> &[LocalVariable] {
        &self.vars
    }
}

/// Finds the most recent binding for `name`, with its position in `vars`.
pub(crate) fn lookup<'v>(vars: &'v [LocalVariable], name: &str) -> Option<(usize, &'v Binding)> {
    vars.iter()
        .enumerate()
        .rev()
        .find(|(_, var)| var.name == name)
        .map(|(idx, var)| (idx, &var.binding))
}
