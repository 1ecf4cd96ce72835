use std::fmt;

/// Unary logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical NOT (`not`)
    Not,
}

/// Binary logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Logical AND (`and`)
    And,
    /// Logical OR (`or`)
    Or,
}

/// Match operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// Equal (`==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Membership (`in`, `contains`)
    In,
    /// Negated membership (`not in`, `not contains`)
    NotIn,
    /// Empty string, bytes or collection (`is empty`)
    IsEmpty,
    /// Non-empty string, bytes or collection (`is not empty`)
    IsNotEmpty,
    /// Regular expression match (`matches`)
    Matches,
    /// Negated regular expression match (`not matches`)
    NotMatches,
}

impl MatchOp {
    /// Result of the operator when its selector names a key that is missing
    /// from a mapping.
    pub fn not_present_disposition(self) -> bool {
        match self {
            MatchOp::Equal | MatchOp::In | MatchOp::Matches | MatchOp::IsNotEmpty => false,
            MatchOp::NotEqual | MatchOp::NotIn | MatchOp::NotMatches | MatchOp::IsEmpty => true,
        }
    }

    pub fn requires_value(self) -> bool {
        !matches!(self, MatchOp::IsEmpty | MatchOp::IsNotEmpty)
    }

    /// Whether the operator is the negation of another one.
    pub fn is_negated(self) -> bool {
        matches!(
            self,
            MatchOp::NotEqual | MatchOp::NotIn | MatchOp::IsNotEmpty | MatchOp::NotMatches
        )
    }
}

impl fmt::Display for MatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MatchOp::Equal => "==",
            MatchOp::NotEqual => "!=",
            MatchOp::In => "in",
            MatchOp::NotIn => "not in",
            MatchOp::IsEmpty => "is empty",
            MatchOp::IsNotEmpty => "is not empty",
            MatchOp::Matches => "matches",
            MatchOp::NotMatches => "not matches",
        };
        f.write_str(text)
    }
}

/// Collection quantifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// Every element satisfies the body (`all`)
    All,
    /// At least one element satisfies the body (`any`)
    Any,
}

impl Quantifier {
    /// Result for a missing or empty collection.
    pub fn vacuous(self) -> bool {
        matches!(self, Quantifier::All)
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantifier::All => f.write_str("all"),
            Quantifier::Any => f.write_str("any"),
        }
    }
}
