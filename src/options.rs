use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::locals::LocalVariable;
use crate::value::Value;

/// Field tag consulted when resolving selectors against records.
pub const DEFAULT_TAG_NAME: &str = "bexpr";

/// Rewrites a value reached during selector resolution. Returning `None`
/// keeps the value unchanged.
pub type ValueHook = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Settings for building an [`Evaluator`](crate::Evaluator) or
/// [`Filter`](crate::Filter).
///
/// # Example
///
/// ```
/// use bexpr::{LocalVariable, Options, Value};
///
/// let options = Options::new()
///     .with_tag_name("json")
///     .with_max_expressions(32)
///     .with_unknown_value(Value::Null)
///     .with_local_variable(LocalVariable::alias("user", vec!["Users".into(), "0".into()]));
///
/// assert_eq!(options.tag_name(), "json");
/// assert_eq!(options.local_variables().len(), 1);
/// ```
#[derive(Clone)]
pub struct Options {
    tag_name: String,
    max_expressions: usize,
    hook: Option<ValueHook>,
    unknown_value: Option<Value>,
    local_variables: Vec<LocalVariable>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            tag_name: DEFAULT_TAG_NAME.to_string(),
            max_expressions: 0,
            hook: None,
            unknown_value: None,
            local_variables: Vec::new(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag_name(mut self, tag_name: impl Into<String>) -> Self {
        self.tag_name = tag_name.into();
        self
    }

    /// Caps the number of AST nodes. `0` means unbounded.
    pub fn with_max_expressions(mut self, max_expressions: usize) -> Self {
        self.max_expressions = max_expressions;
        self
    }

    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Value reported for any selector that cannot be found. It replaces
    /// both the not-present dispositions and `PathNotFound` errors.
    pub fn with_unknown_value(mut self, value: Value) -> Self {
        self.unknown_value = Some(value);
        self
    }

    pub fn with_local_variable(mut self, variable: LocalVariable) -> Self {
        self.local_variables.push(variable);
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn max_expressions(&self) -> usize {
        self.max_expressions
    }

    pub fn hook(&self) -> Option<&ValueHook> {
        self.hook.as_ref()
    }

    pub fn unknown_value(&self) -> Option<&Value> {
        self.unknown_value.as_ref()
    }

    pub fn local_variables(&self) -> &[LocalVariable] {
        &self.local_variables
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.tag_name.is_empty() {
            return Err(Error::InvalidOption("tag name must not be empty".to_string()));
        }
        if let Some(var) = self.local_variables.iter().find(|v| v.name().is_empty()) {
            return Err(Error::InvalidOption(format!(
                "local variable bound to {} has an empty name",
                var.binding()
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("tag_name", &self.tag_name)
            .field("max_expressions", &self.max_expressions)
            .field("hook", &self.hook.as_ref().map(|_| "<hook>"))
            .field("unknown_value", &self.unknown_value)
            .field("local_variables", &self.local_variables)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.tag_name(), "bexpr");
        assert_eq!(options.max_expressions(), 0);
        assert!(options.hook().is_none());
        assert!(options.unknown_value().is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_empty_tag_name_rejected() {
        let err = Options::new().with_tag_name("").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn test_debug_hides_hook() {
        let options = Options::new().with_hook(|_| None);
        assert!(format!("{:?}", options).contains("<hook>"));
    }
}
