use std::mem;

use thiserror::Error;

use crate::{
    ast::{
        CollectionExpr, Expr, Literal, LiteralForm, MatchExpr, MatchOp, NameBinding, Quantifier,
        Selector, Token,
    },
    lexer::{LexError, Lexer, Position},
};

/// Deepest nesting of parentheses, `not` operators and collection bodies.
pub const MAX_NESTING: usize = 128;

/// Tallest expression tree the parser builds, counted in nodes from the root
/// to the deepest match.
pub const MAX_DEPTH: usize = 1024;

/// A syntax error, located in the source.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind} at {position} (byte {})", .position.offset)]
pub struct ParseError {
    pub position: Position,
    pub kind: ParseErrorKind,
}

impl ParseError {
    fn new(source: &str, offset: usize, kind: ParseErrorKind) -> Self {
        ParseError {
            position: Position::locate(source, offset),
            kind,
        }
    }

    /// Byte offset of the error in the source.
    pub fn offset(&self) -> usize {
        self.position.offset
    }

    pub fn is_too_large(&self) -> bool {
        matches!(self.kind, ParseErrorKind::ExpressionTooLarge { .. })
    }

    pub fn is_too_deep(&self) -> bool {
        matches!(self.kind, ParseErrorKind::NestingTooDeep { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Lex(LexError),

    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("'{0}' is a reserved word and cannot be used as a name")]
    ReservedWord(String),

    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),

    #[error("expression exceeds the maximum of {limit} expressions")]
    ExpressionTooLarge { limit: usize },

    #[error("expression nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },
}

/// Text of a keyword token, for reserved-word diagnostics.
fn reserved_word(token: &Token) -> Option<&'static str> {
    let word = match token {
        Token::And => "and",
        Token::Or => "or",
        Token::Not => "not",
        Token::In => "in",
        Token::Is => "is",
        Token::Empty => "empty",
        Token::Matches => "matches",
        Token::Contains => "contains",
        Token::All => "all",
        Token::Any => "any",
        Token::As => "as",
        Token::Boolean(true) => "true",
        Token::Boolean(false) => "false",
        _ => return None,
    };
    Some(word)
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    current_start: usize,
    max_expressions: usize,
    expressions: usize,
    nesting: usize,
    // height of the last node built
    height: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self, ParseError> {
        let current_token = lexer
            .next_token()
            .map_err(|e| Self::lex_error(lexer.source(), e))?;
        let current_start = lexer.token_start();
        Ok(Parser {
            lexer,
            current_token,
            current_start,
            max_expressions: 0,
            expressions: 0,
            nesting: 0,
            height: 0,
        })
    }

    /// Caps the number of expression nodes; zero means unbounded.
    pub fn with_max_expressions(mut self, max_expressions: usize) -> Self {
        self.max_expressions = max_expressions;
        self
    }

    /// Number of expression nodes built so far.
    pub fn expression_count(&self) -> usize {
        self.expressions
    }

    fn lex_error(source: &str, e: LexError) -> ParseError {
        ParseError::new(source, e.offset(), ParseErrorKind::Lex(e))
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.lexer.source(), self.current_start, kind)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match reserved_word(&self.current_token) {
            Some(word) if expected.contains("name") || expected.contains("selector") => {
                self.error(ParseErrorKind::ReservedWord(word.to_string()))
            }
            _ => self.error(ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current_token.to_string(),
            }),
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self
            .lexer
            .next_token()
            .map_err(|e| Self::lex_error(self.lexer.source(), e))?;
        self.current_start = self.lexer.token_start();
        Ok(())
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if mem::discriminant(&self.current_token) != mem::discriminant(&expected) {
            return Err(self.unexpected(&expected.to_string()));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    /// Counts one node against the expression budget.
    fn count(&mut self) -> Result<(), ParseError> {
        self.expressions += 1;
        if self.max_expressions > 0 && self.expressions > self.max_expressions {
            return Err(self.error(ParseErrorKind::ExpressionTooLarge {
                limit: self.max_expressions,
            }));
        }
        Ok(())
    }

    /// Records the height of a node already counted.
    fn finish(&mut self, expr: Expr, height: usize) -> Result<Expr, ParseError> {
        if height > MAX_DEPTH {
            return Err(self.error(ParseErrorKind::NestingTooDeep { limit: MAX_DEPTH }));
        }
        self.height = height;
        Ok(expr)
    }

    fn node(&mut self, expr: Expr, height: usize) -> Result<Expr, ParseError> {
        self.count()?;
        self.finish(expr, height)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.nesting == MAX_NESTING {
            return Err(self.error(ParseErrorKind::NestingTooDeep { limit: MAX_NESTING }));
        }
        self.nesting += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    /// Parse a selector: `A.B.0["c d"]`
    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut segments = match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => vec![name],
            token => {
                self.current_token = token;
                return Err(self.unexpected("selector"));
            }
        };
        self.advance()?;

        loop {
            if self.check(&Token::Dot) {
                self.advance()?; // consume '.'
                match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::Identifier(name) => segments.push(name),
                    Token::Number(index) if index.bytes().all(|b| b.is_ascii_digit()) => {
                        segments.push(index)
                    }
                    token => {
                        self.current_token = token;
                        return Err(self.unexpected("selector segment"));
                    }
                }
                self.advance()?;
            } else if self.check(&Token::LBracket) {
                self.advance()?; // consume '['
                match mem::replace(&mut self.current_token, Token::Eof) {
                    Token::String(key) | Token::RawString(key) => segments.push(key),
                    token => {
                        self.current_token = token;
                        return Err(self.unexpected("quoted key"));
                    }
                }
                self.advance()?;
                self.expect(Token::RBracket)?;
            } else {
                break;
            }
        }

        // segments starts non-empty
        Selector::new(segments).ok_or_else(|| self.unexpected("selector"))
    }

    fn parse_literal(&mut self) -> Result<Literal, ParseError> {
        let literal = match &self.current_token {
            Token::String(s) | Token::RawString(s) => Literal::string(s.clone()),
            Token::Number(n) => Literal::number(n.clone()),
            Token::Boolean(b) => Literal::boolean(*b),
            _ => return Err(self.unexpected("literal value")),
        };
        self.advance()?;
        Ok(literal)
    }

    /// The literal of a `matches`, compiled up front so bad patterns are
    /// reported at parse time.
    fn parse_pattern(&mut self) -> Result<Literal, ParseError> {
        let start = self.current_start;
        let literal = self.parse_literal()?;
        if literal.form() != LiteralForm::String {
            return Err(ParseError::new(
                self.lexer.source(),
                start,
                ParseErrorKind::UnexpectedToken {
                    expected: "string pattern".to_string(),
                    found: format!("{}", literal),
                },
            ));
        }
        if let Err(e) = literal.regex() {
            return Err(ParseError::new(
                self.lexer.source(),
                start,
                ParseErrorKind::InvalidRegex(e.to_string()),
            ));
        }
        Ok(literal)
    }

    /// `Selector ==|!=|contains|not contains|matches|not matches Literal`
    /// and `Selector is [not] empty`
    fn parse_selector_match(&mut self) -> Result<Expr, ParseError> {
        let selector = self.parse_selector()?;

        let op = match &self.current_token {
            Token::EqEq => MatchOp::Equal,
            Token::NotEq => MatchOp::NotEqual,
            Token::Contains => MatchOp::In,
            Token::Matches => MatchOp::Matches,
            Token::Not => {
                self.advance()?;
                match &self.current_token {
                    Token::Contains => MatchOp::NotIn,
                    Token::Matches => MatchOp::NotMatches,
                    _ => return Err(self.unexpected("'contains' or 'matches'")),
                }
            }
            Token::Is => {
                self.advance()?;
                if self.check(&Token::Not) {
                    self.advance()?;
                    MatchOp::IsNotEmpty
                } else {
                    MatchOp::IsEmpty
                }
            }
            _ => return Err(self.unexpected("match operator")),
        };

        let value = match op {
            MatchOp::IsEmpty | MatchOp::IsNotEmpty => {
                self.expect(Token::Empty)?;
                None
            }
            MatchOp::Matches | MatchOp::NotMatches => {
                self.advance()?;
                Some(self.parse_pattern()?)
            }
            _ => {
                self.advance()?;
                Some(self.parse_literal()?)
            }
        };

        self.node(
            Expr::Match(MatchExpr {
                selector,
                op,
                value,
            }),
            1,
        )
    }

    /// `Literal ==|!=|in|not in Selector`
    fn parse_literal_match(&mut self) -> Result<Expr, ParseError> {
        let value = self.parse_literal()?;

        let op = match &self.current_token {
            Token::EqEq => MatchOp::Equal,
            Token::NotEq => MatchOp::NotEqual,
            Token::In => MatchOp::In,
            Token::Not => {
                self.advance()?;
                if !self.check(&Token::In) {
                    return Err(self.unexpected("'in'"));
                }
                MatchOp::NotIn
            }
            _ => return Err(self.unexpected("'==', '!=', 'in' or 'not in'")),
        };
        self.advance()?;

        let selector = self.parse_selector()?;
        self.node(
            Expr::Match(MatchExpr {
                selector,
                op,
                value: Some(value),
            }),
            1,
        )
    }

    fn parse_binding_name(&mut self) -> Result<String, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.advance()?;
                Ok(name)
            }
            token => {
                self.current_token = token;
                Err(self.unexpected("variable name"))
            }
        }
    }

    /// `all|any Selector as name[, name] { Expr }`
    fn parse_collection(&mut self) -> Result<Expr, ParseError> {
        let quantifier = match self.current_token {
            Token::All => Quantifier::All,
            _ => Quantifier::Any,
        };
        self.advance()?; // consume quantifier

        let selector = self.parse_selector()?;
        self.expect(Token::As)?;

        let first = self.parse_binding_name()?;
        let binding = if self.check(&Token::Comma) {
            self.advance()?;
            let value = self.parse_binding_name()?;
            NameBinding::IndexAndValue {
                index: first,
                value,
            }
        } else {
            NameBinding::Default(first)
        };

        self.count()?;
        self.enter()?;
        self.expect(Token::LBrace)?;
        let body = self.parse_expression()?;
        self.expect(Token::RBrace)?;
        self.leave();

        let height = self.height + 1;
        self.finish(
            Expr::Collection(CollectionExpr {
                quantifier,
                selector,
                binding,
                body: Box::new(body),
            }),
            height,
        )
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match &self.current_token {
            Token::LParen => {
                self.enter()?;
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                self.leave();
                Ok(expr)
            }
            Token::All | Token::Any => self.parse_collection(),
            Token::Identifier(_) => self.parse_selector_match(),
            Token::String(_) | Token::RawString(_) | Token::Number(_) | Token::Boolean(_) => {
                self.parse_literal_match()
            }
            Token::And
            | Token::Or
            | Token::In
            | Token::Is
            | Token::Empty
            | Token::Matches
            | Token::Contains
            | Token::As => {
                let word = reserved_word(&self.current_token).unwrap_or_default();
                Err(self.error(ParseErrorKind::ReservedWord(word.to_string())))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_not(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Not) {
            // counted before the operand so a capped parse stops early
            self.count()?;
            self.enter()?;
            self.advance()?;
            let operand = self.parse_not()?; // Right-associative
            self.leave();
            let height = self.height + 1;
            return self.finish(Expr::not(operand), height);
        }
        self.parse_primary()
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_not()?;

        while self.check(&Token::And) {
            self.advance()?;
            let left_height = self.height;
            let right = self.parse_not()?;
            let height = left_height.max(self.height) + 1;
            left = self.node(Expr::and(left, right), height)?;
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::Or) {
            self.advance()?;
            let left_height = self.height;
            let right = self.parse_and()?;
            let height = left_height.max(self.height) + 1;
            left = self.node(Expr::or(left, right), height)?;
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(Token::Eof)?;
        Ok(expr)
    }
}

/// Parses `source` into an expression tree, failing once more than
/// `max_expressions` nodes are built (zero means unbounded).
pub fn parse(source: &str, max_expressions: usize) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(source))?
        .with_max_expressions(max_expressions)
        .parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_offset() {
        let err = parse("Name == ", 0).unwrap_err();
        assert_eq!(err.offset(), 8);
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_too_large() {
        let err = parse("A == 1 and B == 2", 2).unwrap_err();
        assert!(err.is_too_large());
        assert!(parse("A == 1 and B == 2", 3).is_ok());
    }

    #[test]
    fn test_not_counted_before_operand() {
        let source = format!("{}A == 1", "not ".repeat(10));
        let err = parse(&source, 3).unwrap_err();
        assert!(err.is_too_large());
        assert_eq!(err.offset(), 12);
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}A == 1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert!(parse(&ok, 0).is_ok());

        let deep = format!("{}A == 1{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        let err = parse(&deep, 0).unwrap_err();
        assert!(err.is_too_deep());
        assert_eq!(err.offset(), MAX_NESTING);
    }

    #[test]
    fn test_reserved_selector() {
        let err = parse("empty == 1", 0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ReservedWord("empty".into()));
        let err = parse("A.in == 1", 0).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ReservedWord("in".into()));
    }
}
