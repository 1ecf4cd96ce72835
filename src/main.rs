use bexpr::cli::{self, CheckOptions, CheckResult, CliError, FilterOptions};
use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "bexpr")]
#[command(about = "bexpr - Evaluate boolean expressions against JSON documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an expression and evaluate it against a JSON document
    Check {
        /// The expression to evaluate
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Field tag used to name record fields
        #[arg(long)]
        tag_name: Option<String>,

        /// Maximum number of expressions, 0 for no limit
        #[arg(long, default_value_t = 0)]
        max_expressions: usize,
    },

    /// Keep the elements of a JSON array, or entries of an object, that match
    Filter {
        /// The expression to match
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            expression,
            input,
            syntax_only,
            tag_name,
            max_expressions,
        } => {
            let input = if syntax_only { Ok(input) } else { read_input(input) };
            input.and_then(|input| {
                run_check(CheckOptions {
                    expression,
                    input,
                    syntax_only,
                    tag_name,
                    max_expressions,
                })
            })
        }
        Commands::Filter {
            expression,
            input,
            pretty,
        } => read_input(input)
            .and_then(|input| run_filter(FilterOptions { expression, input }, pretty)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn run_check(options: CheckOptions) -> Result<(), CliError> {
    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Matched(matched) => println!("{}", matched),
    }
    Ok(())
}

fn run_filter(options: FilterOptions, pretty: bool) -> Result<(), CliError> {
    let output = cli::execute_filter(&options)?;
    if pretty {
        println!("{:#}", output);
    } else {
        println!("{}", output);
    }
    Ok(())
}
