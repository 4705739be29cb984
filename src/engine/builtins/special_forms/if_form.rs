use crate::engine::ast::Value;
use crate::engine::env::Environment;
use crate::engine::eval::{LispError, eval as main_eval};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, instrument, trace};

#[instrument(skip(args, env), fields(args = ?args), ret, err)]
pub fn eval_if(args: &[Value], env: Rc<RefCell<Environment>>) -> Result<Value, LispError> {
    trace!("Executing 'if' special form");
    if args.len() < 2 || args.len() > 3 {
        error!(
            "'if' special form requires 2 or 3 arguments (condition, then-branch, [else-branch]), found {}",
            args.len()
        );
        return Err(LispError::ArityMismatch(format!(
            "'if' expects 2 or 3 arguments, got {}",
            args.len()
        )));
    }

    let condition_expr = &args[0];
    let then_expr = &args[1];
    let else_expr_opt = args.get(2);

    let condition_result = main_eval(condition_expr, Rc::clone(&env))?;
    debug!(?condition_result, "Evaluated 'if' condition");

    if condition_result.is_truthy() {
        trace!("Condition is truthy, evaluating then-branch");
        main_eval(then_expr, env)
    } else if let Some(else_expr) = else_expr_opt {
        trace!("Condition is false, evaluating else-branch");
        main_eval(else_expr, env)
    } else {
        trace!("Condition is false, no else-branch");
        Ok(Value::Unspecified)
    }
}
