use crate::engine::ast::Value;
use crate::engine::eval::LispError;
use tracing::{instrument, trace};

/// Renders arguments the way the REPL prints values, joined by single spaces.
pub fn format_print_line(args: &[Value]) -> String {
    args.iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[instrument(skip(args), ret, err)]
pub fn native_print(args: Vec<Value>) -> Result<Value, LispError> {
    trace!("Executing native 'print' function");
    println!("{}", format_print_line(&args));
    Ok(Value::Unspecified)
}
