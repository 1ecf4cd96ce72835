//! # bexpr - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the bexpr boolean
//! expression language, a small predicate language for matching and filtering
//! in-memory structured data.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (logical, match, collection)
//! - **[operators]** - Logical, match and quantifier operators
//! - **[selector]** - Dotted paths into the datum
//! - **[literal]** - Raw literal values with their cached regex
//!
//! ## Quick Start
//!
//! ```text
//! Name == "Alice" and Age != 18
//! ```
//!
//! This expression matches records whose `Name` is `Alice` and whose `Age`
//! is anything but `18`.
//!
//! ## Core Concepts
//!
//! ### Match Expressions
//!
//! A match expression pairs a selector with an operator and, for most
//! operators, a literal:
//!
//! ```text
//! Name == "Alice"
//! Name != "Bob"
//! "admin" in Roles
//! Roles contains "admin"
//! Notes matches "^hello"
//! Tags is not empty
//! ```
//!
//! Literals are stored as raw text and converted to the kind of the value
//! they are compared against at evaluation time, so `Age == "30"` and
//! `Age == 30` mean the same thing.
//!
//! ### Collection Expressions
//!
//! `all` and `any` quantify over a sequence or mapping, binding local names
//! for the body:
//!
//! ```text
//! any Users as u { u.Role == "admin" }
//! all Tags as key, value { value is not empty }
//! ```
//!
//! With a single name, a sequence binds the element and a mapping binds the
//! key. With two names, the first is the index or key and the second is the
//! element or entry value.
//!
//! ### Precedence
//!
//! Match operators bind tightest, then `not`, then `and`, then `or`.
//! Parentheses override.
pub mod expressions;
pub mod literal;
pub mod operators;
pub mod selector;
pub mod tokens;

pub use expressions::{CollectionExpr, Expr, MatchExpr, NameBinding};
pub use literal::{Literal, LiteralForm};
pub use operators::{BinaryOp, MatchOp, Quantifier, UnaryOp};
pub use selector::Selector;
pub use tokens::Token;
