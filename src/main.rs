mod cli;
mod engine;
mod logging;
mod repl;

use crate::cli::{Cli, Commands, ReplArgs, RunArgs};
use crate::engine::ast::Value;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval};
use crate::engine::parser::parse_program;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{debug, info};

/// Parses `source` and evaluates each top-level form in order against `env`.
///
/// A syntax error rejects the whole source. Otherwise every form is evaluated, and a
/// failing form does not stop the ones after it.
pub fn evaluate_source(
    source: &str,
    env: Rc<RefCell<Environment>>,
) -> Result<Vec<Result<Value, LispError>>, LispError> {
    let forms = parse_program(source)?;
    debug!(count = forms.len(), "Evaluating top-level forms");
    Ok(forms
        .iter()
        .map(|form| eval(form, Rc::clone(&env)))
        .collect())
}

/// Evaluates `source` and writes results to `out` and errors to `err`.
///
/// Values that print as nothing (e.g. the result of `define`) produce no line.
/// Returns the number of failures, counting a syntax error as one.
pub fn report_source(
    source: &str,
    env: Rc<RefCell<Environment>>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<usize> {
    let outcomes = match evaluate_source(source, env) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            writeln!(err, "Error: {}", e)?;
            return Ok(1);
        }
    };

    let mut failures = 0;
    for outcome in outcomes {
        match outcome {
            Ok(value) => {
                let rendered = value.to_string();
                if !rendered.is_empty() {
                    writeln!(out, "{}", rendered)?;
                }
            }
            Err(e) => {
                failures += 1;
                writeln!(err, "Error: {}", e)?;
            }
        }
    }
    out.flush()?;
    Ok(failures)
}

fn run_command(args: &RunArgs, env: Rc<RefCell<Environment>>) -> Result<()> {
    let (source, origin) = match (&args.expr, &args.file) {
        (Some(expr), _) => (expr.clone(), "<expr>".to_string()),
        (None, Some(path)) => (
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read source file {}", path.display()))?,
            path.display().to_string(),
        ),
        (None, None) => bail!("Nothing to run: pass --expr or a file path"),
    };
    info!(origin = %origin, "Running source");

    let failures = report_source(&source, env, &mut io::stdout(), &mut io::stderr())?;
    if failures > 0 {
        bail!("{} form(s) in {} failed", failures, origin);
    }
    Ok(())
}

fn main() -> Result<()> {
    logging::init_logging();
    let cli = Cli::parse();
    info!(?cli, "Parsed CLI arguments");

    let env = Environment::new_with_prelude();
    match &cli.command {
        Some(Commands::Run(args)) => run_command(args, env),
        Some(Commands::Repl(args)) => repl::start_repl(env, args),
        None => repl::start_repl(env, &ReplArgs::default()),
    }
}
