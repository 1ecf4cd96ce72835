//! Evaluate an expression against a JSON document

use super::{CliError, parse_input};
use crate::{Evaluator, Options};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON input string
    pub input: Option<String>,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
    /// Field tag used to name record fields
    pub tag_name: Option<String>,
    /// AST node cap, 0 for none
    pub max_expressions: usize,
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Whether the input matched
    Matched(bool),
}

/// Execute a bexpr check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let mut evaluator_options = Options::new().with_max_expressions(options.max_expressions);
    if let Some(tag_name) = &options.tag_name {
        evaluator_options = evaluator_options.with_tag_name(tag_name.clone());
    }

    let evaluator = Evaluator::new(&options.expression, evaluator_options)?;
    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let datum = parse_input(options.input.as_deref())?;
    Ok(CheckResult::Matched(evaluator.evaluate(&datum)?))
}
