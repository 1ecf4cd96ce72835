// tests/lexer_tests.rs

use bexpr::ast::Token;
use bexpr::lexer::{LexError, Lexer};

fn tokens(input: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(input);
    let mut out = Vec::new();
    loop {
        let token = lexer.next_token().unwrap();
        if token == Token::Eof {
            return out;
        }
        out.push(token);
    }
}

fn lex_error(input: &str) -> LexError {
    let mut lexer = Lexer::new(input);
    loop {
        match lexer.next_token() {
            Ok(Token::Eof) => panic!("expected an error for {:?}", input),
            Ok(_) => {}
            Err(e) => return e,
        }
    }
}

// ============================================================================
// Punctuation and Operators
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        (".", Token::Dot),
        (",", Token::Comma),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_two_char_tokens() {
    assert_eq!(tokens("== !="), vec![Token::EqEq, Token::NotEq]);
}

#[test]
fn test_lone_equals_is_an_error() {
    let err = lex_error("A = 1");
    assert!(matches!(err, LexError::Incomplete { found: '=', offset: 2, .. }));

    let err = lex_error("A ! 1");
    assert!(matches!(err, LexError::Incomplete { found: '!', .. }));
}

#[test]
fn test_unexpected_char() {
    let err = lex_error("A == 1 & B");
    assert_eq!(err, LexError::UnexpectedChar { ch: '&', offset: 7 });
}

// ============================================================================
// Keywords and Identifiers
// ============================================================================

#[test]
fn test_keywords_are_case_sensitive() {
    assert_eq!(
        tokens("and And AND"),
        vec![
            Token::And,
            Token::Identifier("And".into()),
            Token::Identifier("AND".into()),
        ]
    );
}

#[test]
fn test_identifiers() {
    assert_eq!(
        tokens("Name item_count _internal Ünïcode"),
        vec![
            Token::Identifier("Name".into()),
            Token::Identifier("item_count".into()),
            Token::Identifier("_internal".into()),
            Token::Identifier("Ünïcode".into()),
        ]
    );
}

#[test]
fn test_selector_with_index() {
    assert_eq!(
        tokens("Items.0.1"),
        vec![
            Token::Identifier("Items".into()),
            Token::Dot,
            Token::Number("0".into()),
            Token::Dot,
            Token::Number("1".into()),
        ]
    );
}

#[test]
fn test_index_followed_by_letters() {
    let err = lex_error("Items.0abc");
    assert!(matches!(err, LexError::InvalidNumber { offset: 6, .. }));
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numbers_keep_their_text() {
    assert_eq!(
        tokens("42 -7 0x1F 0o17 0b101 3.14 1e-9 2.5E+3"),
        vec![
            Token::Number("42".into()),
            Token::Number("-7".into()),
            Token::Number("0x1F".into()),
            Token::Number("0o17".into()),
            Token::Number("0b101".into()),
            Token::Number("3.14".into()),
            Token::Number("1e-9".into()),
            Token::Number("2.5E+3".into()),
        ]
    );
}

#[test]
fn test_invalid_numbers() {
    for input in ["12abc", "0x", "1e", "0b102"] {
        let err = lex_error(input);
        assert!(
            matches!(err, LexError::InvalidNumber { offset: 0, .. }),
            "Failed for input: {}",
            input
        );
    }
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_string_escapes() {
    assert_eq!(
        tokens(r#""a\"b\\c\n\té😀""#),
        vec![Token::String("a\"b\\c\n\té😀".into())]
    );
}

#[test]
fn test_raw_string_keeps_backslashes() {
    assert_eq!(tokens(r"`^\d+$`"), vec![Token::RawString(r"^\d+$".into())]);
}

#[test]
fn test_string_errors() {
    assert_eq!(lex_error(r#""abc"#), LexError::UnterminatedString { offset: 0 });
    assert_eq!(lex_error("`abc"), LexError::UnterminatedString { offset: 0 });
    assert_eq!(lex_error(r#""a\qb""#), LexError::InvalidEscape { ch: 'q', offset: 2 });
    assert!(matches!(lex_error(r#""\u12""#), LexError::InvalidUnicodeEscape { .. }));
    assert!(matches!(lex_error(r#""\ud83d""#), LexError::InvalidUnicodeEscape { .. }));
}

#[test]
fn test_token_start_tracks_offsets() {
    let mut lexer = Lexer::new("  Name ==\n \"x\"");
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), 2);
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), 7);
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), 11);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    assert_eq!(lexer.token_start(), 14);
}
