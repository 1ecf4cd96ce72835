//! Filter a JSON array or object

use super::{CliError, parse_input};
use crate::{Filter, output};

/// Options for the filter command
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// The expression each element or entry must match
    pub expression: String,
    /// JSON input string
    pub input: Option<String>,
}

/// Execute a bexpr filter operation, returning the matching part of the input
pub fn execute_filter(options: &FilterOptions) -> Result<serde_json::Value, CliError> {
    let filter = Filter::new(&options.expression)?;
    let data = parse_input(options.input.as_deref())?;
    let matched = filter.execute(&data)?;
    Ok(output::to_json(&matched))
}
