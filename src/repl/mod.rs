pub mod highlighter;
mod history;

use crate::cli::ReplArgs;
use crate::engine::env::Environment;
use highlighter::ReplHelper;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use tracing::{info, warn};

/// Returns true for the inputs that end the session.
fn is_exit_command(input: &str) -> bool {
    matches!(input, ".exit" | "(exit)")
}

#[tracing::instrument(skip(env, args))]
pub fn start_repl(env: Rc<RefCell<Environment>>, args: &ReplArgs) -> anyhow::Result<()> {
    info!("Starting REPL session with rustyline");
    let mut rl = Editor::<ReplHelper, DefaultHistory>::new()?;
    rl.set_helper(Some(ReplHelper));

    let history_path_opt = args.history.clone().or_else(history::default_history_path);
    match &history_path_opt {
        Some(history_path) => history::load_history_from_path(&mut rl, history_path),
        None => warn!("Could not determine history file path. History will not be saved."),
    }

    let mut line_number = 1;
    loop {
        let prompt = format!("minischeme ({})> ", line_number);
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed_input = line.trim();
                if trimmed_input.is_empty() {
                    continue;
                }

                if let Err(err) = rl.add_history_entry(line.as_str()) {
                    warn!("Failed to add line to history: {}", err);
                }

                if is_exit_command(trimmed_input) {
                    info!("Exiting REPL session via user command.");
                    println!("Exiting.");
                    break;
                }

                // Errors are reported and the loop keeps going with the same root environment.
                crate::report_source(
                    trimmed_input,
                    Rc::clone(&env),
                    &mut io::stdout(),
                    &mut io::stderr(),
                )?;
                line_number += 1;
            }
            Err(ReadlineError::Interrupted) => {
                info!("REPL interrupted (Ctrl-C).");
                println!("Interrupted. Type .exit, (exit), or Ctrl-D to exit.");
            }
            Err(ReadlineError::Eof) => {
                info!("REPL EOF detected (Ctrl-D).");
                println!("Exiting.");
                break;
            }
            Err(err) => {
                eprintln!("REPL Readline Error: {:?}", err);
                break;
            }
        }
    }

    if let Some(history_path) = &history_path_opt {
        history::save_history_to_path(&mut rl, history_path);
    }
    Ok(())
}
