use std::fmt;

use crate::ast::{Token, literal::quote};

/// A non-empty path into the datum.
///
/// # Examples
/// ```text
/// Name                 → ["Name"]
/// A.B.C                → ["A", "B", "C"]
/// Items.0.Name         → ["Items", "0", "Name"]
/// Tags["team name"]    → ["Tags", "team name"]
/// ```
///
/// The first segment may name a local variable bound by an enclosing
/// `all`/`any` expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector(Vec<String>);

impl Selector {
    /// Returns `None` when `segments` is empty.
    pub fn new(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Selector(segments))
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn first(&self) -> &str {
        &self.0[0]
    }

    /// The path of one of this selector's children.
    pub fn child(&self, segment: impl Into<String>) -> Vec<String> {
        let mut path = self.0.clone();
        path.push(segment.into());
        path
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_') && !Token::is_keyword(s)
}

fn is_index(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first())?;
        for segment in &self.0[1..] {
            if is_identifier(segment) || is_index(segment) {
                write!(f, ".{}", segment)?;
            } else {
                write!(f, "[{}]", quote(segment))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(segments: &[&str]) -> Selector {
        Selector::new(segments.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_empty_selector_rejected() {
        assert!(Selector::new(vec![]).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(selector(&["A", "B", "C"]).to_string(), "A.B.C");
        assert_eq!(selector(&["Items", "0", "Name"]).to_string(), "Items.0.Name");
        assert_eq!(
            selector(&["Tags", "team name"]).to_string(),
            r#"Tags["team name"]"#
        );
        assert_eq!(selector(&["Meta", "empty"]).to_string(), r#"Meta["empty"]"#);
    }

    #[test]
    fn test_child() {
        assert_eq!(selector(&["Users"]).child("3"), vec!["Users", "3"]);
    }
}
