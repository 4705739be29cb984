use crate::engine::ast::Value;
use crate::engine::builtins::special_forms::lambda_form::make_closure;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval as main_eval};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, instrument, trace};

/// `(define name expr)` or `(define (name params...) body)`.
///
/// Binds in the calling frame only and yields `Unspecified`.
#[instrument(skip(args, env), fields(args = ?args), ret, err)]
pub fn eval_define(args: &[Value], env: Rc<RefCell<Environment>>) -> Result<Value, LispError> {
    trace!("Executing 'define' special form");
    if args.len() != 2 {
        error!(
            "'define' special form requires 2 arguments (target and value), found {}",
            args.len()
        );
        return Err(LispError::ArityMismatch(format!(
            "'define' expects 2 arguments, got {}",
            args.len()
        )));
    }

    let (name, value) = match &args[0] {
        Value::Atom(name) => {
            debug!(variable_name = %name, value_expression = %args[1], "'define' binding variable");
            let value = main_eval(&args[1], Rc::clone(&env))?;
            (name.clone(), value)
        }
        Value::List(signature) => {
            let Some((head, params)) = signature.split_first() else {
                error!("'define' function shorthand has an empty signature");
                return Err(LispError::TypeMismatch {
                    expected: "(name params...)".to_string(),
                    found: "()".to_string(),
                });
            };
            let Value::Atom(name) = head else {
                error!("Function name in 'define' must be an atom, found {:?}", head);
                return Err(LispError::TypeMismatch {
                    expected: "Atom".to_string(),
                    found: head.to_string(),
                });
            };
            debug!(function_name = %name, "'define' binding function");
            let closure = make_closure(params, &args[1], Rc::clone(&env))?;
            (name.clone(), Value::Closure(closure))
        }
        other => {
            error!("First argument to 'define' must be an atom or a list, found {:?}", other);
            return Err(LispError::TypeMismatch {
                expected: "Atom or (name params...)".to_string(),
                found: other.to_string(),
            });
        }
    };

    env.borrow_mut().define(name, value);
    Ok(Value::Unspecified)
}
