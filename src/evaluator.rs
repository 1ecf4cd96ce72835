use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::{
    ast::{BinaryOp, CollectionExpr, Expr, Literal, MatchExpr, MatchOp, NameBinding, UnaryOp},
    coerce::coerce,
    error::{Error, EvalError},
    locals::{LocalStack, LocalVariable},
    options::Options,
    parser,
    resolver::{Lookup, PathResolver, PointerResolver, resolve_selector},
    value::{Reflect, Value},
};

/// A compiled boolean expression.
///
/// The expression is parsed once by [`Evaluator::new`] and can then be
/// evaluated any number of times, from any number of threads.
#[derive(Clone)]
pub struct Evaluator {
    source: String,
    ast: Expr,
    options: Options,
    resolver: Arc<dyn PathResolver>,
}

impl Evaluator {
    /// Parses `source` and prepares it for evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for unusable options and
    /// [`Error::Parse`] when the source is not a valid expression, including
    /// an invalid `matches` pattern or an AST above the configured size.
    ///
    /// # Examples
    ///
    /// ```
    /// use bexpr::{Evaluator, Options, Value};
    ///
    /// let evaluator = Evaluator::new(r#"Name == "Alice" and Age != 18"#, Options::default()).unwrap();
    ///
    /// let datum = Value::from(serde_json::json!({"Name": "Alice", "Age": 30}));
    /// assert!(evaluator.evaluate(&datum).unwrap());
    /// ```
    pub fn new(source: &str, options: Options) -> Result<Self, Error> {
        options.validate()?;
        let ast = parser::parse(source, options.max_expressions())?;
        debug!("compiled {:?} into {} nodes", source, ast.node_count());
        Ok(Evaluator {
            source: source.to_string(),
            ast,
            options,
            resolver: Arc::new(PointerResolver),
        })
    }

    /// Wraps an already built AST. The expression text is its canonical
    /// rendering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] when a match carries a value its
    /// operator does not take (or lacks one it needs), or when the tree is
    /// taller than [`parser::MAX_DEPTH`].
    pub fn from_ast(ast: Expr, options: Options) -> Result<Self, Error> {
        options.validate()?;
        check_tree(&ast)?;
        Ok(Evaluator {
            source: ast.to_string(),
            ast,
            options,
            resolver: Arc::new(PointerResolver),
        })
    }

    /// Replaces the resolver used to navigate data.
    pub fn with_resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// The source text this evaluator was built from.
    pub fn expression(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Evaluates the expression against `datum`.
    ///
    /// # Arguments
    ///
    /// * `datum` - The value selectors are resolved against
    ///
    /// # Returns
    ///
    /// Whether the datum matches. Any error aborts the evaluation; the only
    /// implicit recovery is a key missing from a mapping, which yields the
    /// operator's not-present result.
    pub fn evaluate(&self, datum: &Value) -> Result<bool, EvalError> {
        let mut evaluation = Evaluation {
            options: &self.options,
            resolver: self.resolver.as_ref(),
            locals: LocalStack::new(self.options.local_variables()),
        };
        let result = evaluation.eval(&self.ast, datum);
        trace!("{:?} -> {:?}", self.source, result);
        result
    }

    /// Reflects `datum` into a [`Value`] and evaluates against it.
    pub fn evaluate_with<T: Reflect + ?Sized>(&self, datum: &T) -> Result<bool, EvalError> {
        self.evaluate(&datum.reflect())
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("source", &self.source)
            .field("ast", &self.ast)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Builds an evaluator; same as [`Evaluator::new`].
pub fn create_evaluator(source: &str, options: Options) -> Result<Evaluator, Error> {
    Evaluator::new(source, options)
}

/// Checks operand arity and height without recursing, so over-tall trees
/// are rejected rather than overflowing the stack.
fn check_tree(ast: &Expr) -> Result<(), Error> {
    let mut stack = vec![(ast, 1)];
    while let Some((expr, depth)) = stack.pop() {
        if depth > parser::MAX_DEPTH {
            return Err(Error::InvalidExpression(format!(
                "tree is deeper than {} levels",
                parser::MAX_DEPTH
            )));
        }
        match expr {
            Expr::Unary { operand, .. } => stack.push((operand.as_ref(), depth + 1)),
            Expr::Binary { left, right, .. } => {
                stack.push((left.as_ref(), depth + 1));
                stack.push((right.as_ref(), depth + 1));
            }
            Expr::Match(m) if m.op.requires_value() != m.value.is_some() => {
                let needs = if m.op.requires_value() { "requires" } else { "takes no" };
                return Err(Error::InvalidExpression(format!(
                    "'{}' on {} {} value",
                    m.op, m.selector, needs
                )));
            }
            Expr::Match(_) => {}
            Expr::Collection(c) => stack.push((c.body.as_ref(), depth + 1)),
        }
    }
    Ok(())
}

/// State of a single evaluation.
struct Evaluation<'e> {
    options: &'e Options,
    resolver: &'e dyn PathResolver,
    locals: LocalStack,
}

impl Evaluation<'_> {
    fn eval(&mut self, expr: &Expr, datum: &Value) -> Result<bool, EvalError> {
        match expr {
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => Ok(!self.eval(operand, datum)?),
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                if !self.eval(left, datum)? {
                    return Ok(false);
                }
                self.eval(right, datum)
            }
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                if self.eval(left, datum)? {
                    return Ok(true);
                }
                self.eval(right, datum)
            }
            Expr::Match(m) => self.eval_match(m, datum),
            Expr::Collection(c) => self.eval_collection(c, datum),
        }
    }

    fn resolve<'d>(&self, datum: &'d Value, path: &[String]) -> Result<Lookup<'d>, EvalError> {
        resolve_selector(datum, path, self.locals.as_slice(), self.options, self.resolver)
    }

    fn eval_match(&mut self, m: &MatchExpr, datum: &Value) -> Result<bool, EvalError> {
        let path = m.selector.segments();
        let value = match self.resolve(datum, path)? {
            Lookup::Found(value) => normalize(value)?,
            Lookup::Missing => {
                trace!("{} not present, '{}' yields {}", m.selector, m.op, m.op.not_present_disposition());
                return Ok(m.op.not_present_disposition());
            }
        };

        let matched = match m.op {
            MatchOp::Equal | MatchOp::NotEqual => equals(m, path, &value)?,
            MatchOp::IsEmpty | MatchOp::IsNotEmpty => value
                .len()
                .map(|len| len == 0)
                .ok_or_else(|| EvalError::kind_mismatch(m.op, path, value.kind()))?,
            MatchOp::Matches | MatchOp::NotMatches => matches(m, path, &value)?,
            MatchOp::In | MatchOp::NotIn => contains(m, path, &value)?,
        };
        Ok(matched != m.op.is_negated())
    }

    fn eval_collection(&mut self, c: &CollectionExpr, datum: &Value) -> Result<bool, EvalError> {
        let path = c.selector.segments();
        let container = match self.resolve(datum, path)? {
            Lookup::Found(value) => value,
            Lookup::Missing => return Ok(c.quantifier.vacuous()),
        };

        // (key bound by value, path segment of the element)
        let (entries, is_sequence): (Vec<(Value, String)>, bool) = match container.as_ref() {
            Value::Sequence(seq) => (
                (0..seq.len())
                    .map(|idx| (Value::Int(idx as i64), idx.to_string()))
                    .collect(),
                true,
            ),
            Value::Mapping(map) if !map.has_string_keys() => {
                return Err(EvalError::MapKeyNotString {
                    path: path.join("."),
                    kind: map.key_kind(),
                });
            }
            Value::Mapping(map) => (
                map.iter()
                    .map(|(key, _)| (Value::String(key.clone()), key.clone()))
                    .collect(),
                false,
            ),
            other => return Err(EvalError::kind_mismatch(c.quantifier, path, other.kind())),
        };

        if let NameBinding::IndexAndValue { index, value } = &c.binding {
            if index == value {
                return Err(EvalError::BindingConflict { name: index.clone() });
            }
        }

        let vacuous = c.quantifier.vacuous();
        let mark = self.locals.len();
        for (key, segment) in entries {
            trace!("{} {} visiting {:?}", c.quantifier, c.selector, segment);
            match (&c.binding, is_sequence) {
                (NameBinding::Default(name), true) => {
                    self.locals.push(LocalVariable::alias(name.clone(), c.selector.child(segment)));
                }
                (NameBinding::Default(name), false) => {
                    self.locals.push(LocalVariable::value(name.clone(), key));
                }
                (NameBinding::IndexAndValue { index, value }, _) => {
                    self.locals.push(LocalVariable::value(index.clone(), key));
                    self.locals.push(LocalVariable::alias(value.clone(), c.selector.child(segment)));
                }
            }

            let result = self.eval(&c.body, datum);
            self.locals.truncate(mark);
            if result? != vacuous {
                return Ok(!vacuous);
            }
        }
        Ok(vacuous)
    }
}

/// Replaces a lazily typed JSON number with an integer or a float.
fn normalize(value: Cow<'_, Value>) -> Result<Cow<'_, Value>, EvalError> {
    if let Value::Number(n) = value.as_ref() {
        return number_value(n).map(Cow::Owned);
    }
    Ok(value)
}

fn number_value(n: &serde_json::Number) -> Result<Value, EvalError> {
    if let Some(i) = n.as_i64() {
        Ok(Value::Int(i))
    } else if let Some(f) = n.as_f64() {
        Ok(Value::Float64(f))
    } else {
        Err(EvalError::InvalidNumber(n.to_string()))
    }
}

fn literal(m: &MatchExpr) -> Result<&Literal, EvalError> {
    m.value.as_ref().ok_or(EvalError::MissingValue { op: m.op })
}

fn equals(m: &MatchExpr, path: &[String], value: &Value) -> Result<bool, EvalError> {
    let kind = value.kind();
    if !kind.is_primitive() {
        return Err(EvalError::kind_mismatch(m.op, path, kind));
    }
    let expected = coerce(literal(m)?.raw(), kind)?;
    Ok(expected == *value)
}

fn matches(m: &MatchExpr, path: &[String], value: &Value) -> Result<bool, EvalError> {
    let bytes = value
        .as_bytes()
        .ok_or_else(|| EvalError::kind_mismatch(m.op, path, value.kind()))?;
    let lit = literal(m)?;
    let re = lit.regex().map_err(|e| EvalError::Regex {
        pattern: lit.raw().to_string(),
        message: e.to_string(),
    })?;
    Ok(re.is_match(bytes))
}

fn contains(m: &MatchExpr, path: &[String], value: &Value) -> Result<bool, EvalError> {
    let raw = literal(m)?.raw();
    match value {
        Value::String(s) => Ok(s.contains(raw)),
        Value::Mapping(map) if !map.has_string_keys() => Err(EvalError::MapKeyNotString {
            path: path.join("."),
            kind: map.key_kind(),
        }),
        Value::Mapping(map) => Ok(map.contains_key(raw)),
        Value::Sequence(seq) => match seq.element_kind() {
            Some(elem) => {
                let expected = coerce(raw, elem)?;
                Ok(seq.iter().any(|item| *item == expected))
            }
            None => {
                for item in seq.iter() {
                    let item = normalize(Cow::Borrowed(item))?;
                    let kind = item.kind();
                    if !kind.is_primitive() {
                        continue;
                    }
                    match coerce(raw, kind) {
                        Ok(expected) if expected == *item => return Ok(true),
                        Ok(_) => {}
                        Err(e) if e.is_range() => return Err(e.into()),
                        Err(_) => {}
                    }
                }
                Ok(false)
            }
        },
        other => Err(EvalError::kind_mismatch(m.op, path, other.kind())),
    }
}
