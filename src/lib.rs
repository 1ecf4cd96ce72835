//! Boolean expressions over structured data.
//!
//! An expression such as `Name == "Alice" and "admin" in Roles` is parsed
//! once into an [`Evaluator`] and then evaluated against any number of
//! [`Value`]s. A [`Filter`] applies an evaluator to every element of a
//! sequence or every entry of a mapping.
//!
//! ```
//! use bexpr::{Evaluator, Filter, Options, Value};
//!
//! let datum = Value::from(serde_json::json!({
//!     "Name": "Alice",
//!     "Roles": ["admin", "dev"],
//! }));
//!
//! let evaluator = Evaluator::new(r#"Name == "Alice" and "admin" in Roles"#, Options::default()).unwrap();
//! assert!(evaluator.evaluate(&datum).unwrap());
//!
//! let filter = Filter::new(r#"Name matches "^A""#).unwrap();
//! let people = Value::from(serde_json::json!([{"Name": "Alice"}, {"Name": "Bob"}]));
//! assert_eq!(filter.execute(&people).unwrap().len(), Some(1));
//! ```

pub mod ast;
pub mod cli;
pub mod coerce;
pub mod error;
pub mod evaluator;
pub mod filter;
pub mod lexer;
pub mod locals;
pub mod options;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod value;

pub use ast::{Expr, Token};
pub use error::{Error, EvalError};
pub use evaluator::{Evaluator, create_evaluator};
pub use filter::{Filter, create_filter};
pub use lexer::{LexError, Lexer, Position};
pub use locals::{Binding, LocalVariable};
pub use options::{DEFAULT_TAG_NAME, Options, ValueHook};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use resolver::{PathResolver, PointerResolver, ResolveError};
pub use value::{Field, Kind, Mapping, Record, Reflect, Sequence, Value};
