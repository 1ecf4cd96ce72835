//! Error types shared by evaluators and filters.
//!
//! Construction failures ([`Error`]) are kept apart from evaluation failures
//! ([`EvalError`]): an evaluator that was built successfully can still fail
//! on a particular datum, but never because of its source text.

use thiserror::Error;

use crate::ast::MatchOp;
use crate::coerce::CoerceError;
use crate::parser::ParseError;
use crate::resolver::ResolveError;
use crate::value::Kind;

/// Errors raised while building an evaluator or filter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A hand-built tree the parser could not have produced
    #[error("invalid expression: {0}")]
    InvalidExpression(String),
}

/// Errors raised while evaluating an expression against a datum.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The selector names a field or element that does not exist and whose
    /// parent is not a mapping
    #[error("selector {path:?} not found")]
    PathNotFound { path: String },

    #[error("operator '{op}' cannot be applied to {kind} at {path:?}")]
    KindMismatch { op: String, path: String, kind: Kind },

    #[error("mapping at {path:?} has {kind} keys; only string keys are supported")]
    MapKeyNotString { path: String, kind: Kind },

    #[error("{0}")]
    Coercion(#[from] CoerceError),

    /// A value-bound local variable was followed by more selector segments
    #[error("local variable '{name}' holds a value and cannot be navigated")]
    LocalVariableNotStructured { name: String },

    #[error("'{name}' is bound twice by the same collection expression")]
    BindingConflict { name: String },

    #[error("operator '{op}' requires a value")]
    MissingValue { op: MatchOp },

    #[error("invalid regular expression {pattern:?}: {message}")]
    Regex { pattern: String, message: String },

    #[error("cannot filter a value of kind {0}")]
    FilterUnsupportedKind(Kind),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// A JSON number that fits neither `i64` nor `f64`
    #[error("number {0} cannot be represented as an integer or a float")]
    InvalidNumber(String),
}

impl EvalError {
    pub(crate) fn kind_mismatch(op: impl ToString, path: &[String], kind: Kind) -> Self {
        EvalError::KindMismatch {
            op: op.to_string(),
            path: path.join("."),
            kind,
        }
    }

    /// Whether the error came from converting a literal that was out of range
    /// for the target kind.
    pub fn is_range(&self) -> bool {
        matches!(self, EvalError::Coercion(e) if e.is_range())
    }
}
