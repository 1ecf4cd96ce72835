use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Numeric literal, kept as written
    ///
    /// # Examples
    /// ```text
    /// 42
    /// -7
    /// 0x1F
    /// 3.14
    /// 1e-9
    /// ```
    Number(String),

    /// String literal enclosed in double quotes, escapes already applied
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// "line\nbreak"
    /// ```
    String(String),

    /// Raw string literal enclosed in backticks, no escapes
    ///
    /// # Examples
    /// ```text
    /// `^\d+$`
    /// ```
    RawString(String),

    /// Boolean values
    ///
    /// # Examples
    /// ```text
    /// true
    /// false
    /// ```
    Boolean(bool),

    // Identifiers
    /// Selector segment or local variable name
    ///
    /// Must start with a letter or underscore, followed by letters, digits, or
    /// underscores.
    ///
    /// # Examples
    /// ```text
    /// Name
    /// item_count
    /// _internal
    /// ```
    Identifier(String),

    // Match operators
    /// Equality operator
    EqEq,

    /// Inequality operator
    NotEq,

    /// Membership (`"a" in Tags`)
    In,

    /// Membership with the selector first (`Tags contains "a"`)
    Contains,

    /// Regular expression match
    Matches,

    /// Emptiness test, always followed by `empty` or `not empty`
    Is,

    Empty,

    // Logical
    /// Logical AND (word, not symbol)
    ///
    /// # Examples
    /// ```text
    /// Age != 18 and Verified == true
    /// ```
    And,

    /// Logical OR (word, not symbol)
    Or,

    /// Negation, also part of `not in`, `not matches`, `not contains` and
    /// `is not empty`
    Not,

    // Quantifiers
    /// Universal quantifier
    ///
    /// # Examples
    /// ```text
    /// all Users as u { u.Active == true }
    /// ```
    All,

    /// Existential quantifier
    Any,

    /// Introduces the name binding of a quantifier
    As,

    // Delimiters
    /// Left parenthesis for grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Left brace opening a quantifier body
    LBrace,

    /// Right brace
    RBrace,

    /// Left bracket for quoted selector segments (`Tags["a b"]`)
    LBracket,

    /// Right bracket
    RBracket,

    /// Selector separator
    Dot,

    /// Name binding separator
    Comma,

    /// End of input
    Eof,
}

impl Token {
    /// Maps a reserved word to its token.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "in" => Token::In,
            "is" => Token::Is,
            "empty" => Token::Empty,
            "matches" => Token::Matches,
            "contains" => Token::Contains,
            "all" => Token::All,
            "any" => Token::Any,
            "as" => Token::As,
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            _ => return None,
        };
        Some(token)
    }

    pub fn is_keyword(word: &str) -> bool {
        Token::keyword(word).is_some()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::String(s) => write!(f, "string {:?}", s),
            Token::RawString(s) => write!(f, "raw string `{}`", s),
            Token::Boolean(b) => write!(f, "{}", b),
            Token::Identifier(name) => write!(f, "identifier '{}'", name),
            Token::EqEq => f.write_str("'=='"),
            Token::NotEq => f.write_str("'!='"),
            Token::In => f.write_str("'in'"),
            Token::Contains => f.write_str("'contains'"),
            Token::Matches => f.write_str("'matches'"),
            Token::Is => f.write_str("'is'"),
            Token::Empty => f.write_str("'empty'"),
            Token::And => f.write_str("'and'"),
            Token::Or => f.write_str("'or'"),
            Token::Not => f.write_str("'not'"),
            Token::All => f.write_str("'all'"),
            Token::Any => f.write_str("'any'"),
            Token::As => f.write_str("'as'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::Dot => f.write_str("'.'"),
            Token::Comma => f.write_str("','"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
