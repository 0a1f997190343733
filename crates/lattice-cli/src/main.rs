//! `lattice` CLI: run scripts, evaluate expressions and query JSON documents.
//!
//! ## Usage
//!
//! ```sh
//! # Run a script (stdin → stdout)
//! echo 'let l = [1, 2, 3]; print l[-1]' | lattice run
//!
//! # Run a script file
//! lattice run -i build.lat
//!
//! # Evaluate a single expression
//! lattice eval '{"a": [1, 2]}["a"][-1]'
//!
//! # Evaluate against a JSON document bound as `data`, print JSON
//! lattice eval 'data.departments[0]' --data company.json --json
//!
//! # Read a path out of a JSON document
//! lattice get -i company.json departments 0 employees -1
//!
//! # Debug logging
//! RUST_LOG=lattice_core=debug lattice run -i build.lat
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lattice_core::{
    parse_expr, parse_script, read_path, Environment, Evaluate, Interpreter, Value,
};
use std::io::{self, Read};

#[derive(Parser)]
#[command(
    name = "lattice",
    version,
    about = "Run Lattice scripts and query nested dict/list/axis values"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a script
    Run {
        /// Script file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Evaluate one expression and print its value
    Eval {
        /// The expression source
        expr: String,
        /// JSON file bound to the name `data` while evaluating
        #[arg(long)]
        data: Option<String>,
        /// Print the result as pretty JSON instead of Lattice notation
        #[arg(long)]
        json: bool,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Read the value at a path inside a JSON document
    Get {
        /// JSON input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Path steps; integers (including negative ones) index lists,
        /// everything else is a dictionary key
        #[arg(allow_negative_numbers = true)]
        path: Vec<String>,
        /// Print the result as pretty JSON instead of Lattice notation
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { input } => {
            let source = read_input(input.as_deref())?;
            let program = parse_script(&source).context("Failed to parse script")?;
            tracing::debug!(statements = program.len(), "running script");
            let mut env = Environment::new();
            Interpreter::new()
                .run(&program, &mut env)
                .context("Script failed")?;
        }
        Commands::Eval {
            expr,
            data,
            json,
            output,
        } => {
            let parsed = parse_expr(&expr).context("Failed to parse expression")?;
            let mut env = Environment::new();
            if let Some(path) = data.as_deref() {
                let text = read_input(Some(path))?;
                let document = Value::parse_json(&text)
                    .with_context(|| format!("Failed to parse JSON in {path}"))?;
                env.define("data", document)?;
            }
            let value = Interpreter::new()
                .eval(&parsed, &env)
                .context("Evaluation failed")?;
            write_output(output.as_deref(), &render(&value, json)?)?;
        }
        Commands::Get { input, path, json } => {
            let text = read_input(input.as_deref())?;
            let document = Value::parse_json(&text).context("Failed to parse JSON input")?;
            let steps: Vec<Value> = path.iter().map(String::as_str).map(path_step).collect();
            let value = read_path(&document, &steps)
                .with_context(|| format!("Failed to read path {}", path.join(" ")))?;
            write_output(None, &render(&value, json)?)?;
        }
    }

    Ok(())
}

/// Install a stderr subscriber, but only when `RUST_LOG` asks for one.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// A CLI path step: `-1` and `3` are positions, anything else is a key.
fn path_step(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => Value::str(raw),
    }
}

fn render(value: &Value, json: bool) -> Result<String> {
    let mut text = if json {
        value.to_json_pretty().context("Failed to serialize result")?
    } else {
        value.to_string()
    };
    text.push('\n');
    Ok(text)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
