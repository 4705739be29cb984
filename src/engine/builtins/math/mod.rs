use crate::engine::ast::Value;
use crate::engine::eval::LispError;
use tracing::{error, trace};

// Helper function, not public
fn extract_number(value: &Value, op_name: &str) -> Result<i64, LispError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => {
            let type_error = LispError::TypeMismatch {
                expected: "Number".to_string(),
                found: format!("{} '{}'", value.type_name(), value),
            };
            error!(operator = %op_name, error = %type_error, "Type error in native function");
            Err(type_error)
        }
    }
}

/// Variadic integer addition. `(+)` is 0 and overflow wraps around.
#[tracing::instrument(skip(args), ret, err)]
pub fn native_add(args: Vec<Value>) -> Result<Value, LispError> {
    trace!("Executing native '+' function");
    let mut sum: i64 = 0;
    for arg in &args {
        sum = sum.wrapping_add(extract_number(arg, "+")?);
    }
    Ok(Value::Number(sum))
}
