use std::fmt;
use std::sync::OnceLock;

use regex::bytes::Regex;

/// How a literal was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralForm {
    /// Double-quoted or backtick-quoted string
    String,
    /// Integer or float
    Number,
    /// `true` or `false`
    Boolean,
}

/// A literal value.
///
/// The raw text is converted to the kind of the value it is compared against
/// at evaluation time. For `matches`, the compiled regex is cached in the
/// literal; the cache is published through a [`OnceLock`] so a shared AST
/// can be evaluated from several threads.
#[derive(Debug, Clone)]
pub struct Literal {
    raw: String,
    form: LiteralForm,
    regex: OnceLock<Regex>,
}

impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.form == other.form
    }
}

impl Literal {
    pub fn new(raw: impl Into<String>, form: LiteralForm) -> Self {
        Literal {
            raw: raw.into(),
            form,
            regex: OnceLock::new(),
        }
    }

    pub fn string(raw: impl Into<String>) -> Self {
        Literal::new(raw, LiteralForm::String)
    }

    pub fn number(raw: impl Into<String>) -> Self {
        Literal::new(raw, LiteralForm::Number)
    }

    pub fn boolean(value: bool) -> Self {
        Literal::new(value.to_string(), LiteralForm::Boolean)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn form(&self) -> LiteralForm {
        self.form
    }

    /// The literal compiled as a regular expression, compiling it on first
    /// use.
    pub fn regex(&self) -> Result<&Regex, regex::Error> {
        if let Some(re) = self.regex.get() {
            return Ok(re);
        }
        let re = Regex::new(&self.raw)?;
        Ok(self.regex.get_or_init(|| re))
    }

    pub fn is_compiled(&self) -> bool {
        self.regex.get().is_some()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form {
            LiteralForm::String => f.write_str(&quote(&self.raw)),
            LiteralForm::Number | LiteralForm::Boolean => f.write_str(&self.raw),
        }
    }
}

/// Renders `s` as a double-quoted string the lexer reads back unchanged.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
