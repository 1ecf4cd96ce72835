//! Selector resolution.
//!
//! A [`PathResolver`] walks a datum one selector segment at a time. The
//! evaluator wraps it with local-variable substitution and the handling of
//! missing keys, so resolvers only need to report what they found.

use std::borrow::Cow;

use log::trace;
use thiserror::Error;

use crate::error::EvalError;
use crate::locals::{self, Binding, LocalVariable};
use crate::options::{Options, ValueHook};
use crate::value::{Kind, Value};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("{segment:?} not found")]
    NotFound { segment: String },

    #[error("{segment:?} is not a valid sequence index")]
    InvalidIndex { segment: String },

    #[error("cannot select {segment:?} from {kind}")]
    NotNavigable { segment: String, kind: Kind },

    /// Failure reported by a custom resolver
    #[error("{0}")]
    Custom(String),
}

/// Navigates a datum along a selector path.
pub trait PathResolver: Send + Sync {
    /// Returns the value at `path` below `datum`.
    ///
    /// `tag_name` selects which field tag names record fields; `hook`, when
    /// present, may rewrite every value reached, including `datum` itself.
    fn resolve<'a>(
        &self,
        datum: &'a Value,
        path: &[String],
        tag_name: &str,
        hook: Option<&ValueHook>,
    ) -> Result<Cow<'a, Value>, ResolveError>;
}

/// Resolver for mappings, sequences and records.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerResolver;

impl PointerResolver {
    fn step<'v>(value: &'v Value, segment: &str, tag_name: &str) -> Result<&'v Value, ResolveError> {
        let not_found = || ResolveError::NotFound {
            segment: segment.to_string(),
        };
        match value {
            Value::Mapping(map) => map.get(segment).ok_or_else(not_found),
            Value::Sequence(seq) => {
                let index = parse_index(segment)?;
                seq.get(index).ok_or_else(not_found)
            }
            Value::Record(record) => record.lookup(segment, tag_name).ok_or_else(not_found),
            other => Err(ResolveError::NotNavigable {
                segment: segment.to_string(),
                kind: other.kind(),
            }),
        }
    }
}

impl PathResolver for PointerResolver {
    fn resolve<'a>(
        &self,
        datum: &'a Value,
        path: &[String],
        tag_name: &str,
        hook: Option<&ValueHook>,
    ) -> Result<Cow<'a, Value>, ResolveError> {
        let mut current = apply_hook(Cow::Borrowed(datum), hook);
        for segment in path {
            let next = match current {
                Cow::Borrowed(value) => Cow::Borrowed(Self::step(value, segment, tag_name)?),
                Cow::Owned(value) => Cow::Owned(Self::step(&value, segment, tag_name)?.clone()),
            };
            current = apply_hook(next, hook);
        }
        Ok(current)
    }
}

fn apply_hook<'a>(value: Cow<'a, Value>, hook: Option<&ValueHook>) -> Cow<'a, Value> {
    match hook.and_then(|h| h(value.as_ref())) {
        Some(rewritten) => Cow::Owned(rewritten),
        None => value,
    }
}

fn parse_index(segment: &str) -> Result<usize, ResolveError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ResolveError::InvalidIndex {
            segment: segment.to_string(),
        });
    }
    segment.parse().map_err(|_| ResolveError::InvalidIndex {
        segment: segment.to_string(),
    })
}

/// Outcome of resolving a selector.
#[derive(Debug)]
pub(crate) enum Lookup<'a> {
    Found(Cow<'a, Value>),
    /// A key missing from a mapping
    Missing,
}

/// Resolves `path` below `datum`, substituting local variables first.
pub(crate) fn resolve_selector<'a>(
    datum: &'a Value,
    path: &[String],
    locals: &[LocalVariable],
    options: &Options,
    resolver: &dyn PathResolver,
) -> Result<Lookup<'a>, EvalError> {
    let Some(first) = path.first() else {
        return Ok(Lookup::Found(Cow::Borrowed(datum)));
    };

    if let Some((idx, binding)) = locals::lookup(locals, first) {
        return match binding {
            Binding::Alias(prefix) => {
                let mut concrete = prefix.clone();
                concrete.extend_from_slice(&path[1..]);
                trace!("substituted '{}' in {:?} -> {:?}", first, path, concrete);
                resolve_selector(datum, &concrete, &locals[..idx], options, resolver)
            }
            Binding::Value(value) if path.len() == 1 => Ok(Lookup::Found(Cow::Owned(value.clone()))),
            Binding::Value(_) => Err(EvalError::LocalVariableNotStructured {
                name: first.clone(),
            }),
        };
    }

    match resolver.resolve(datum, path, options.tag_name(), options.hook()) {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(ResolveError::NotFound { .. }) => {
            if let Some(unknown) = options.unknown_value() {
                return Ok(Lookup::Found(Cow::Owned(unknown.clone())));
            }
            let parent = &path[..path.len() - 1];
            let parent_is_mapping = resolver
                .resolve(datum, parent, options.tag_name(), options.hook())
                .map(|p| matches!(p.as_ref(), Value::Mapping(_)))
                .unwrap_or(false);
            if parent_is_mapping {
                Ok(Lookup::Missing)
            } else {
                Err(EvalError::PathNotFound {
                    path: path.join("."),
                })
            }
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Mapping, Record, Sequence};

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    fn datum() -> Value {
        let mut inner = Mapping::new();
        inner.insert("b", Value::Int(1));
        let seq = Sequence::heterogeneous(vec![Value::from("x"), Value::Mapping(inner)]);
        let mut root = Mapping::new();
        root.insert("items", Value::Sequence(seq));
        root.insert(
            "user",
            Value::Record(
                Record::new("User")
                    .tagged_field("Name", "bexpr", "name", Value::from("ann"))
                    .tagged_field("Secret", "bexpr", "-", Value::from("s")),
            ),
        );
        Value::Mapping(root)
    }

    #[test]
    fn test_pointer_resolver_navigates() {
        let d = datum();
        let r = PointerResolver;
        let v = r.resolve(&d, &path(&["items", "1", "b"]), "bexpr", None).unwrap();
        assert_eq!(v.as_ref(), &Value::Int(1));
        let v = r.resolve(&d, &path(&["user", "name"]), "bexpr", None).unwrap();
        assert_eq!(v.as_ref(), &Value::from("ann"));
        assert!(matches!(r.resolve(&d, &path(&["user", "Secret"]), "bexpr", None), Err(ResolveError::NotFound { .. })));
        assert!(matches!(r.resolve(&d, &path(&["items", "x"]), "bexpr", None), Err(ResolveError::InvalidIndex { .. })));
        assert!(matches!(r.resolve(&d, &path(&["items", "0", "y"]), "bexpr", None), Err(ResolveError::NotNavigable { .. })));
    }

    #[test]
    fn test_missing_key_under_mapping() {
        let d = datum();
        let options = Options::default();
        let lookup = resolve_selector(&d, &path(&["nope"]), &[], &options, &PointerResolver).unwrap();
        assert!(matches!(lookup, Lookup::Missing));

        let err = resolve_selector(&d, &path(&["items", "7"]), &[], &options, &PointerResolver).unwrap_err();
        assert_eq!(err, EvalError::PathNotFound { path: "items.7".to_string() });
    }

    #[test]
    fn test_alias_restart_sees_outer_binding() {
        let d = datum();
        let options = Options::default();
        let locals = vec![
            LocalVariable::alias("x", path(&["items"])),
            LocalVariable::alias("x", path(&["x", "1"])),
        ];
        let lookup = resolve_selector(&d, &path(&["x", "b"]), &locals, &options, &PointerResolver).unwrap();
        match lookup {
            Lookup::Found(v) => assert_eq!(v.as_ref(), &Value::Int(1)),
            Lookup::Missing => panic!("expected a value"),
        }
    }

    #[test]
    fn test_hook_rewrites_values() {
        let d = datum();
        let options = Options::default().with_hook(|v| match v {
            Value::String(s) => Some(Value::String(s.to_uppercase())),
            _ => None,
        });
        let lookup = resolve_selector(&d, &path(&["user", "name"]), &[], &options, &PointerResolver).unwrap();
        match lookup {
            Lookup::Found(v) => assert_eq!(v.as_ref(), &Value::from("ANN")),
            Lookup::Missing => panic!("expected a value"),
        }
    }
}
