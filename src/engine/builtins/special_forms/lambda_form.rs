use crate::engine::ast::{Closure, Value};
use crate::engine::env::Environment;
use crate::engine::eval::LispError;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, error, instrument, trace};

#[instrument(skip(args, env), fields(args = ?args), ret, err)]
pub fn eval_lambda(args: &[Value], env: Rc<RefCell<Environment>>) -> Result<Value, LispError> {
    trace!("Executing 'lambda' special form");
    if args.len() != 2 {
        error!(
            "'lambda' special form requires 2 arguments (parameters list and body), found {}",
            args.len()
        );
        return Err(LispError::ArityMismatch(format!(
            "'lambda' expects 2 arguments (parameters list and body), got {}",
            args.len()
        )));
    }

    let params_list = match &args[0] {
        Value::List(list) => list.as_slice(),
        other => {
            error!("First argument to 'lambda' must be a list of parameters, found {:?}", other);
            return Err(LispError::TypeMismatch {
                expected: "List of parameters".to_string(),
                found: other.to_string(),
            });
        }
    };

    make_closure(params_list, &args[1], env).map(Value::Closure)
}

/// Builds a closure over `body` capturing `env`.
///
/// Shared with the `(define (name params...) body)` shorthand. Parameters must be
/// atoms with distinct names.
pub fn make_closure(
    params: &[Value],
    body: &Value,
    env: Rc<RefCell<Environment>>,
) -> Result<Closure, LispError> {
    let mut param_names = Vec::with_capacity(params.len());
    let mut seen = HashSet::new();
    for param in params {
        match param {
            Value::Atom(name) => {
                if !seen.insert(name.as_str()) {
                    error!(parameter = %name, "Parameter name appears more than once");
                    return Err(LispError::DuplicateParameter(name.clone()));
                }
                param_names.push(name.clone());
            }
            other => {
                error!("Parameters must be atoms, found {:?}", other);
                return Err(LispError::TypeMismatch {
                    expected: "Atom".to_string(),
                    found: other.to_string(),
                });
            }
        }
    }

    debug!(parameters = ?param_names, body = %body, "Creating closure");
    Ok(Closure {
        params: param_names,
        body: Box::new(body.clone()),
        env,
    })
}
