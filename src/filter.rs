use log::debug;

use crate::{
    error::{Error, EvalError},
    evaluator::Evaluator,
    options::Options,
    value::{Mapping, Reflect, Sequence, Value},
};

/// Selects the elements of a sequence, or the entries of a mapping, whose
/// value matches an expression.
///
/// A filter built from empty or whitespace-only source matches everything
/// and returns its input unchanged.
///
/// # Examples
///
/// ```
/// use bexpr::{Filter, Value};
///
/// let filter = Filter::new(r#"Name == "b""#).unwrap();
/// let data = Value::from(serde_json::json!([{"Name": "a"}, {"Name": "b"}]));
/// let matched = filter.execute(&data).unwrap();
/// assert_eq!(matched.len(), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Filter {
    evaluator: Option<Evaluator>,
}

impl Filter {
    pub fn new(source: &str) -> Result<Self, Error> {
        Self::with_options(source, Options::default())
    }

    pub fn with_options(source: &str, options: Options) -> Result<Self, Error> {
        if source.trim().is_empty() {
            options.validate()?;
            debug!("empty filter source, input passes through unchanged");
            return Ok(Filter { evaluator: None });
        }
        Ok(Filter {
            evaluator: Some(Evaluator::new(source, options)?),
        })
    }

    pub fn from_evaluator(evaluator: Evaluator) -> Self {
        Filter {
            evaluator: Some(evaluator),
        }
    }

    /// Whether the filter passes every input through unchanged.
    pub fn is_identity(&self) -> bool {
        self.evaluator.is_none()
    }

    pub fn evaluator(&self) -> Option<&Evaluator> {
        self.evaluator.as_ref()
    }

    /// Returns a new container holding the matching elements or entries.
    ///
    /// Sequences keep their element order and element kind; fixed-size
    /// arrays come back as variable-size sequences. Mappings keep their
    /// key kind and entry order. Any other kind is an error, as is any
    /// error raised while evaluating an element.
    pub fn execute(&self, data: &Value) -> Result<Value, EvalError> {
        let Some(evaluator) = &self.evaluator else {
            return Ok(data.clone());
        };

        match data {
            Value::Sequence(seq) => {
                let mut out = Sequence::new(seq.element_kind());
                for item in seq.iter() {
                    if evaluator.evaluate(item)? {
                        out.push(item.clone());
                    }
                }
                debug!("filter kept {} of {} elements", out.len(), seq.len());
                Ok(Value::Sequence(out))
            }
            Value::Mapping(map) => {
                let mut out = Mapping::with_key_kind(map.key_kind());
                for (key, value) in map.iter() {
                    if evaluator.evaluate(value)? {
                        out.insert(key.clone(), value.clone());
                    }
                }
                debug!("filter kept {} of {} entries", out.len(), map.len());
                Ok(Value::Mapping(out))
            }
            other => Err(EvalError::FilterUnsupportedKind(other.kind())),
        }
    }

    /// Reflects `data` into a [`Value`] and filters it.
    pub fn execute_with<T: Reflect + ?Sized>(&self, data: &T) -> Result<Value, EvalError> {
        self.execute(&data.reflect())
    }
}

/// Builds a filter with default options; same as [`Filter::new`].
pub fn create_filter(source: &str) -> Result<Filter, Error> {
    Filter::new(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;

    fn entry(name: &str) -> Mapping {
        let mut map = Mapping::new();
        map.insert("Name", Value::from(name));
        map
    }

    #[test]
    fn test_fixed_array_becomes_sequence() {
        let data = [entry("a"), entry("b")].reflect();
        let filter = Filter::new(r#"Name == "b""#).unwrap();
        match filter.execute(&data).unwrap() {
            Value::Sequence(seq) => {
                assert!(!seq.is_fixed());
                assert_eq!(seq.element_kind(), Some(Kind::Mapping));
                assert_eq!(seq.items(), &[Value::Mapping(entry("b"))]);
            }
            other => panic!("expected a sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_identity_filter() {
        let filter = Filter::new("  \n").unwrap();
        assert!(filter.is_identity());
        assert_eq!(filter.execute(&Value::Int(3)).unwrap(), Value::Int(3));
    }

    #[test]
    fn test_scalar_rejected() {
        let filter = Filter::new("A == 1").unwrap();
        assert_eq!(
            filter.execute(&Value::from("x")),
            Err(EvalError::FilterUnsupportedKind(Kind::String))
        );
    }
}
