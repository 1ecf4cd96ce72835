//! CLI support for bexpr
//!
//! Provides programmatic access to the `bexpr` subcommands for embedding in
//! other tools.

mod check;
mod filter;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use filter::{FilterOptions, execute_filter};

use std::io;

use thiserror::Error;

use crate::Value;

/// Errors that can occur during CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// The expression could not be built
    #[error("{0}")]
    Parse(#[from] crate::Error),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --input or pipe JSON to stdin.")]
    NoInput,
}

/// Parses the JSON document given on the command line or stdin.
fn parse_input(input: Option<&str>) -> Result<Value, CliError> {
    let json = input.ok_or(CliError::NoInput)?;
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(Value::from(value))
}
