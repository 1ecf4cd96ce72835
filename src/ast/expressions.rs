use std::fmt;

use crate::ast::{BinaryOp, Literal, MatchOp, Quantifier, Selector, UnaryOp};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// The AST is the internal representation of an expression after parsing.
/// It is built once and only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Negation
    ///
    /// # Example
    /// ```text
    /// not Name == "Alice"
    /// ```
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Short-circuiting logical combination
    ///
    /// # Examples
    /// ```text
    /// Name == "Alice" and Age != 18
    /// Role == "admin" or Role == "owner"
    /// ```
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Selector tested with a match operator
    Match(MatchExpr),

    /// Quantifier over a sequence or mapping
    Collection(CollectionExpr),
}

/// A selector tested with a match operator.
///
/// `value` is present exactly when [`MatchOp::requires_value`] holds.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    pub selector: Selector,
    pub op: MatchOp,
    pub value: Option<Literal>,
}

/// `all`/`any` over the container at `selector`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionExpr {
    pub quantifier: Quantifier,
    pub selector: Selector,
    pub binding: NameBinding,
    pub body: Box<Expr>,
}

/// Names introduced by a collection expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameBinding {
    /// `as x`: the element of a sequence or the key of a mapping
    Default(String),

    /// `as k, v`: index or key, and element or entry value
    IndexAndValue { index: String, value: String },
}

impl Expr {
    pub fn not(operand: Expr) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op: BinaryOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op: BinaryOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        match self {
            Expr::Unary { operand, .. } => 1 + operand.node_count(),
            Expr::Binary { left, right, .. } => 1 + left.node_count() + right.node_count(),
            Expr::Match(_) => 1,
            Expr::Collection(c) => 1 + c.body.node_count(),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary {
                op: BinaryOp::Or, ..
            } => 1,
            Expr::Binary {
                op: BinaryOp::And, ..
            } => 2,
            Expr::Unary { .. } => 3,
            Expr::Match(_) | Expr::Collection(_) => 4,
        }
    }

    fn fmt_at(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            f.write_str("(")?;
            self.fmt_at(f, 1)?;
            return f.write_str(")");
        }

        match self {
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => {
                f.write_str("not ")?;
                operand.fmt_at(f, 3)
            }
            Expr::Binary { op, left, right } => {
                let (word, level) = match op {
                    BinaryOp::Or => ("or", 1),
                    BinaryOp::And => ("and", 2),
                };
                left.fmt_at(f, level)?;
                write!(f, " {} ", word)?;
                right.fmt_at(f, level + 1)
            }
            Expr::Match(m) => write!(f, "{}", m),
            Expr::Collection(c) => write!(f, "{}", c),
        }
    }
}

/// Renders canonical source that parses back to an equal tree.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_at(f, 1)
    }
}

impl fmt::Display for MatchExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.op, &self.value) {
            (MatchOp::In | MatchOp::NotIn, Some(value)) => {
                write!(f, "{} {} {}", value, self.op, self.selector)
            }
            (op, Some(value)) => write!(f, "{} {} {}", self.selector, op, value),
            (op, None) => write!(f, "{} {}", self.selector, op),
        }
    }
}

impl fmt::Display for CollectionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} as {} {{ {} }}",
            self.quantifier, self.selector, self.binding, self.body
        )
    }
}

impl fmt::Display for NameBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameBinding::Default(name) => f.write_str(name),
            NameBinding::IndexAndValue { index, value } => write!(f, "{}, {}", index, value),
        }
    }
}
