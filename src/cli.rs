use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// A small Scheme-flavoured interpreter: integers, booleans, `if`, `define`, `lambda`.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(name = "minischeme", bin_name = "minischeme")]
pub struct Cli {
    /// Starts the REPL when no subcommand is given.
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluates an expression from a string or executes a source file.
    Run(RunArgs),
    /// Starts an interactive read-eval-print loop.
    Repl(ReplArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source code to evaluate.
    #[clap(short, long, value_name = "CODE", conflicts_with = "file")]
    pub expr: Option<String>,

    /// Path to a source file to execute.
    #[clap(value_name = "FILE_PATH", conflicts_with = "expr", required_unless_present = "expr")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct ReplArgs {
    /// File used to persist line history between sessions.
    #[clap(long, value_name = "PATH", env = "MINISCHEME_HISTORY")]
    pub history: Option<PathBuf>,
}
