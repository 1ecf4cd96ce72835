use std::fmt;

use thiserror::Error;

use crate::ast::Token;

/// A location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset from the start of the source
    pub offset: usize,
    /// 1-based line
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

impl Position {
    /// Computes line and column for a byte offset into `source`.
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let mut line = 1;
        let mut column = 1;
        for (idx, ch) in source.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence '\\{ch}'")]
    InvalidEscape { ch: char, offset: usize },

    #[error("invalid unicode escape")]
    InvalidUnicodeEscape { offset: usize },

    #[error("invalid numeric literal '{text}'")]
    InvalidNumber { text: String, offset: usize },

    #[error("unexpected '{found}' (did you mean '{expected}'?)")]
    Incomplete {
        found: char,
        expected: &'static str,
        offset: usize,
    },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnexpectedChar { offset, .. }
            | LexError::UnterminatedString { offset }
            | LexError::InvalidEscape { offset, .. }
            | LexError::InvalidUnicodeEscape { offset }
            | LexError::InvalidNumber { offset, .. }
            | LexError::Incomplete { offset, .. } => *offset,
        }
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    token_start: usize,
    after_dot: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            token_start: 0,
            after_dot: false,
        }
    }

    pub fn source(&self) -> &'a str {
        self.input
    }

    /// Byte offset where the most recently returned token starts.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input[self.position..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += ch.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if matches!(ch, ' ' | '\t' | '\r' | '\n') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }
        &self.input[start..self.position]
    }

    fn read_hex4(&mut self) -> Result<u32, LexError> {
        let start = self.position;
        let digits = self
            .input
            .get(start..start + 4)
            .filter(|d| d.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or(LexError::InvalidUnicodeEscape { offset: start })?;
        self.position += 4;
        u32::from_str_radix(digits, 16).map_err(|_| LexError::InvalidUnicodeEscape { offset: start })
    }

    fn read_unicode_escape(&mut self) -> Result<char, LexError> {
        let start = self.position;
        let high = self.read_hex4()?;
        if (0xD800..0xDC00).contains(&high) {
            // surrogate pair
            if self.current_char() == Some('\\') && self.peek_char(1) == Some('u') {
                self.advance();
                self.advance();
                let low = self.read_hex4()?;
                if (0xDC00..0xE000).contains(&low) {
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    return char::from_u32(code)
                        .ok_or(LexError::InvalidUnicodeEscape { offset: start });
                }
            }
            return Err(LexError::InvalidUnicodeEscape { offset: start });
        }
        char::from_u32(high).ok_or(LexError::InvalidUnicodeEscape { offset: start })
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.position;
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('b') => result.push('\u{8}'),
                        Some('f') => result.push('\u{c}'),
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some('u') => {
                            self.advance();
                            result.push(self.read_unicode_escape()?);
                            continue;
                        }
                        Some(ch) => return Err(LexError::InvalidEscape { ch, offset: escape_at }),
                        None => return Err(LexError::UnterminatedString { offset: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { offset: start })
    }

    fn read_raw_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        self.advance(); // Consume opening backtick
        let body_start = self.position;
        match self.input[body_start..].find('`') {
            Some(len) => {
                self.position = body_start + len + 1;
                Ok(self.input[body_start..body_start + len].to_string())
            }
            None => Err(LexError::UnterminatedString { offset: start }),
        }
    }

    fn read_digits(&mut self, radix: u32) -> usize {
        let start = self.position;
        while let Some(ch) = self.current_char() {
            if ch.is_digit(radix) {
                self.advance();
            } else {
                break;
            }
        }
        self.position - start
    }

    /// Reads an integer or float literal, keeping its text as written.
    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;

        if self.current_char() == Some('-') {
            self.advance();
        }

        let prefixed_radix = match (self.current_char(), self.peek_char(1)) {
            (Some('0'), Some('x' | 'X')) => Some(16),
            (Some('0'), Some('o' | 'O')) => Some(8),
            (Some('0'), Some('b' | 'B')) => Some(2),
            _ => None,
        };

        let valid = if let Some(radix) = prefixed_radix {
            self.advance();
            self.advance();
            self.read_digits(radix) > 0
        } else {
            let mut valid = self.read_digits(10) > 0;
            if self.current_char() == Some('.')
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                self.advance();
                self.read_digits(10);
            }
            if matches!(self.current_char(), Some('e' | 'E')) {
                self.advance();
                if matches!(self.current_char(), Some('+' | '-')) {
                    self.advance();
                }
                valid &= self.read_digits(10) > 0;
            }
            valid
        };

        // 12abc is neither a number nor an identifier
        let trailing = self
            .current_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_');
        if !valid || trailing {
            while self
                .current_char()
                .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
            {
                self.advance();
            }
            return Err(LexError::InvalidNumber {
                text: self.input[start..self.position].to_string(),
                offset: start,
            });
        }

        Ok(Token::Number(self.input[start..self.position].to_string()))
    }

    /// After a `.`, digits form a plain index segment, so `Items.0.1` is
    /// three segments rather than `Items` followed by the float `0.1`.
    fn read_index(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        self.read_digits(10);
        if let Some(ch) = self
            .current_char()
            .filter(|c| c.is_alphabetic() || *c == '_')
        {
            return Err(LexError::InvalidNumber {
                text: format!("{}{}", &self.input[start..self.position], ch),
                offset: start,
            });
        }
        Ok(Token::Number(self.input[start..self.position].to_string()))
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;
        let after_dot = std::mem::replace(&mut self.after_dot, false);

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('{') => self.single(Token::LBrace),
            Some('}') => self.single(Token::RBrace),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some(',') => self.single(Token::Comma),
            Some('.') => {
                self.after_dot = true;
                self.single(Token::Dot)
            }
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::EqEq
                } else {
                    return Err(LexError::Incomplete {
                        found: '=',
                        expected: "==",
                        offset: self.position,
                    });
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Token::NotEq
                } else {
                    return Err(LexError::Incomplete {
                        found: '!',
                        expected: "!=",
                        offset: self.position,
                    });
                }
            }
            Some('"') => Token::String(self.read_string()?),
            Some('`') => Token::RawString(self.read_raw_string()?),
            Some(ch) if ch.is_ascii_digit() && after_dot => self.read_index()?,
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                Token::keyword(ident).unwrap_or_else(|| Token::Identifier(ident.to_string()))
            }
            Some(ch) => {
                return Err(LexError::UnexpectedChar {
                    ch,
                    offset: self.position,
                });
            }
        };

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let mut lexer = Lexer::new("and or not in is empty matches contains all any as true false");
        assert_eq!(lexer.next_token().unwrap(), Token::And);
        assert_eq!(lexer.next_token().unwrap(), Token::Or);
        assert_eq!(lexer.next_token().unwrap(), Token::Not);
        assert_eq!(lexer.next_token().unwrap(), Token::In);
        assert_eq!(lexer.next_token().unwrap(), Token::Is);
        assert_eq!(lexer.next_token().unwrap(), Token::Empty);
        assert_eq!(lexer.next_token().unwrap(), Token::Matches);
        assert_eq!(lexer.next_token().unwrap(), Token::Contains);
        assert_eq!(lexer.next_token().unwrap(), Token::All);
        assert_eq!(lexer.next_token().unwrap(), Token::Any);
        assert_eq!(lexer.next_token().unwrap(), Token::As);
        assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
        assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_match() {
        let mut lexer = Lexer::new("A.B == \"x\"");
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("A".into()));
        assert_eq!(lexer.next_token().unwrap(), Token::Dot);
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("B".into()));
        assert_eq!(lexer.next_token().unwrap(), Token::EqEq);
        assert_eq!(lexer.token_start(), 4);
        assert_eq!(lexer.next_token().unwrap(), Token::String("x".into()));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_position_locate() {
        let pos = Position::locate("a ==\n  b", 7);
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
    }
}
