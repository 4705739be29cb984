use crate::engine::ast::Value;
use crate::engine::env::Environment;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, error, instrument, trace};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LispError {
    #[error("Undefined symbol: {0}")]
    UndefinedSymbol(String),
    #[error("Empty expression: () cannot be evaluated")]
    EmptyExpression,
    #[error("Arity mismatch: {0}")]
    ArityMismatch(String),
    #[error("Type error: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("Not a procedure: {0}")]
    NotAProcedure(String),
    #[error("Not applicable as an expression: {0}")]
    NotApplicableAsExpression(String),
    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),
    #[error("Syntax error: {0}")]
    Syntax(String),
}

#[instrument(skip(expr, env), fields(expr = %expr), ret, err)]
pub fn eval(expr: &Value, env: Rc<RefCell<Environment>>) -> Result<Value, LispError> {
    trace!("Starting evaluation");
    match expr {
        Value::Number(_) | Value::Bool(_) => Ok(expr.clone()),
        Value::Atom(name) => {
            debug!(symbol_name = %name, "Evaluating Atom");
            env.borrow().lookup(name)
        }
        Value::List(list) => {
            let Some((head, rest)) = list.split_first() else {
                error!("Attempted to evaluate an empty list");
                return Err(LispError::EmptyExpression);
            };

            // A head atom bound to a special form hands over the raw operands.
            if let Value::Atom(name) = head {
                let bound = env.borrow().get(name);
                if let Some(Value::SpecialForm(form)) = bound {
                    debug!(special_form = %form.name, "Dispatching to special form");
                    return (form.func)(rest, env);
                }
            }

            trace!("Head is not a special form, evaluating as procedure call");
            let operator = eval(head, Rc::clone(&env))?;

            let mut evaluated_args = Vec::with_capacity(rest.len());
            for arg_expr in rest {
                evaluated_args.push(eval(arg_expr, Rc::clone(&env))?);
            }

            apply(operator, evaluated_args)
        }
        Value::Builtin(_) | Value::SpecialForm(_) | Value::Closure(_) | Value::Unspecified => {
            error!(value = ?expr, "Runtime value fed back into the evaluator");
            Err(LispError::NotApplicableAsExpression(format!(
                "{} values cannot be evaluated as source",
                expr.type_name()
            )))
        }
    }
}

/// Applies a closure or builtin to a list of evaluated arguments.
#[instrument(skip(operator, evaluated_args), fields(operator = %operator, args = ?evaluated_args), ret, err)]
pub fn apply(operator: Value, evaluated_args: Vec<Value>) -> Result<Value, LispError> {
    match operator {
        Value::Closure(closure) => {
            debug!(function = ?closure, "Applying Closure");

            if evaluated_args.len() != closure.params.len() {
                error!(
                    expected = closure.params.len(),
                    got = evaluated_args.len(),
                    "Arity mismatch for function call"
                );
                return Err(LispError::ArityMismatch(format!(
                    "procedure expects {} arguments, got {}",
                    closure.params.len(),
                    evaluated_args.len()
                )));
            }

            let call_env = Environment::child(&closure.env);
            {
                let mut frame = call_env.borrow_mut();
                for (param_name, arg_value) in closure.params.iter().zip(evaluated_args) {
                    frame.define(param_name.clone(), arg_value);
                }
            }

            eval(&closure.body, call_env)
        }
        Value::Builtin(native_fn) => {
            debug!(native_function_name = %native_fn.name, "Applying builtin");
            (native_fn.func)(evaluated_args)
        }
        Value::Atom(_)
        | Value::Number(_)
        | Value::Bool(_)
        | Value::List(_)
        | Value::SpecialForm(_)
        | Value::Unspecified => {
            error!(evaluated_to = ?operator, "Attempted to call a non-procedure");
            Err(LispError::NotAProcedure(format!(
                "expected a procedure, but found {} '{}'",
                operator.type_name(),
                operator
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ast::{Closure, NativeFunction};
    use crate::engine::parser::parse_program;
    use crate::logging::init_test_logging;

    fn atom(name: &str) -> Value {
        Value::Atom(name.to_string())
    }

    /// Evaluates every form in `source` against `env`, returning the last result.
    fn run(source: &str, env: &Rc<RefCell<Environment>>) -> Result<Value, LispError> {
        let mut last = Value::Unspecified;
        for form in parse_program(source)? {
            last = eval(&form, Rc::clone(env))?;
        }
        Ok(last)
    }

    #[test]
    fn eval_number_ignores_env() {
        init_test_logging();
        for n in [0, 42, -7, i64::MAX, i64::MIN] {
            assert_eq!(eval(&Value::Number(n), Environment::new()), Ok(Value::Number(n)));
            assert_eq!(
                eval(&Value::Number(n), Environment::new_with_prelude()),
                Ok(Value::Number(n))
            );
        }
    }

    #[test]
    fn eval_bool_literals() {
        init_test_logging();
        let env = Environment::new();
        assert_eq!(eval(&Value::Bool(true), Rc::clone(&env)), Ok(Value::Bool(true)));
        assert_eq!(eval(&Value::Bool(false), env), Ok(Value::Bool(false)));
    }

    #[test]
    fn eval_atom_defined_in_env() {
        init_test_logging();
        let env = Environment::new();
        env.borrow_mut().define("x".to_string(), Value::Number(100));
        assert_eq!(eval(&atom("x"), env), Ok(Value::Number(100)));
    }

    #[test]
    fn eval_atom_defined_in_ancestor() {
        init_test_logging();
        let root = Environment::new();
        root.borrow_mut().define("x".to_string(), Value::Number(100));
        let inner = Environment::child(&Environment::child(&root));
        assert_eq!(eval(&atom("x"), inner), Ok(Value::Number(100)));
    }

    #[test]
    fn eval_atom_undefined() {
        init_test_logging();
        let env = Environment::new();
        assert_eq!(
            eval(&atom("my_var"), env),
            Err(LispError::UndefinedSymbol("my_var".to_string()))
        );
    }

    #[test]
    fn eval_empty_list_is_an_error() {
        init_test_logging();
        let env = Environment::new();
        assert_eq!(eval(&Value::List(vec![]), env), Err(LispError::EmptyExpression));
    }

    #[test]
    fn eval_runtime_values_as_source() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        let plus = env.borrow().get("+").expect("+ is installed");
        let if_form = env.borrow().get("if").expect("if is installed");
        let closure = Value::Closure(Closure {
            params: vec![],
            body: Box::new(Value::Number(1)),
            env: Rc::clone(&env),
        });
        for value in [plus, if_form, closure, Value::Unspecified] {
            assert!(matches!(
                eval(&value, Rc::clone(&env)),
                Err(LispError::NotApplicableAsExpression(_))
            ));
        }
    }

    #[test]
    fn eval_call_defined_non_procedure() {
        init_test_logging();
        let env = Environment::new();
        env.borrow_mut().define("x".to_string(), Value::Number(10));
        let expr = Value::List(vec![atom("x"), Value::Number(1), Value::Number(2)]);
        assert_eq!(
            eval(&expr, env),
            Err(LispError::NotAProcedure(
                "expected a procedure, but found Number '10'".to_string()
            ))
        );
    }

    #[test]
    fn eval_call_unknown_head() {
        init_test_logging();
        let env = Environment::new();
        let expr = Value::List(vec![atom("unknown_function"), Value::Number(1)]);
        assert_eq!(
            eval(&expr, env),
            Err(LispError::UndefinedSymbol("unknown_function".to_string()))
        );
    }

    #[test]
    fn special_form_as_value_is_not_a_procedure() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        // The head is a list, so there is no special-form pre-dispatch.
        let result = run("(((lambda (f) f) if) #t 1 2)", &env);
        assert!(matches!(result, Err(LispError::NotAProcedure(_))));
    }

    #[test]
    fn special_form_under_another_name_still_dispatches() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        run("(define when if)", &env).expect("alias defines");
        assert_eq!(run("(when #f undefined-name 5)", &env), Ok(Value::Number(5)));
    }

    #[test]
    fn argument_evaluation_stops_at_first_error() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        // If evaluation continued past `missing`, `z` would be bound.
        let result = run("(+ 1 missing (define z 1))", &env);
        assert_eq!(result, Err(LispError::UndefinedSymbol("missing".to_string())));
        assert_eq!(env.borrow().get("z"), None);
    }

    #[test]
    fn operator_errors_before_arguments_are_evaluated() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        let result = run("(nope (define z 1))", &env);
        assert_eq!(result, Err(LispError::UndefinedSymbol("nope".to_string())));
        assert_eq!(env.borrow().get("z"), None);
    }

    #[test]
    fn arguments_are_evaluated_left_to_right() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        run("(define x 1)", &env).expect("define x");
        // The second operand redefines x after the first has already read it.
        let result = run("(+ x (if (define x 10) 0 0) x)", &env);
        assert_eq!(result, Ok(Value::Number(11)));
    }

    #[test]
    fn apply_builtin_directly() {
        init_test_logging();
        fn always_seven(_args: Vec<Value>) -> Result<Value, LispError> {
            Ok(Value::Number(7))
        }
        let builtin = Value::Builtin(NativeFunction {
            name: "seven".to_string(),
            func: always_seven,
        });
        assert_eq!(apply(builtin, vec![Value::Bool(true)]), Ok(Value::Number(7)));
    }

    #[test]
    fn apply_closure_binds_positionally() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        let closure = run("(lambda (a b) b)", &env).expect("lambda evaluates");
        assert_eq!(
            apply(closure, vec![Value::Number(1), Value::Number(2)]),
            Ok(Value::Number(2))
        );
    }

    #[test]
    fn apply_closure_arity_mismatch() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        let closure = run("(lambda (a b) a)", &env).expect("lambda evaluates");
        assert_eq!(
            apply(closure.clone(), vec![Value::Number(1)]),
            Err(LispError::ArityMismatch(
                "procedure expects 2 arguments, got 1".to_string()
            ))
        );
        assert_eq!(
            apply(closure, vec![Value::Number(1), Value::Number(2), Value::Number(3)]),
            Err(LispError::ArityMismatch(
                "procedure expects 2 arguments, got 3".to_string()
            ))
        );
    }

    #[test]
    fn arity_mismatch_binds_nothing() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        let closure = run("(lambda (a) a)", &env).expect("lambda evaluates");
        let Value::Closure(inner) = &closure else {
            panic!("expected a closure, got {:?}", closure);
        };
        let _ = apply(closure.clone(), vec![]);
        assert_eq!(inner.env.borrow().get("a"), None);
    }

    #[test]
    fn apply_non_procedures() {
        init_test_logging();
        for value in [
            Value::Number(1),
            atom("x"),
            Value::Bool(false),
            Value::List(vec![]),
            Value::Unspecified,
        ] {
            assert!(matches!(apply(value, vec![]), Err(LispError::NotAProcedure(_))));
        }
    }

    #[test]
    fn closures_use_lexical_not_dynamic_scope() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        run("(define x 1)", &env).expect("define x");
        run("(define (get-x) x)", &env).expect("define get-x");
        run("(define (shadow x) (get-x))", &env).expect("define shadow");
        assert_eq!(run("(shadow 99)", &env), Ok(Value::Number(1)));
    }

    #[test]
    fn closures_retain_their_activation_frame() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        run("(define (make-adder n) (lambda (m) (+ n m)))", &env).expect("define make-adder");
        run("(define add5 (make-adder 5))", &env).expect("define add5");
        run("(define add10 (make-adder 10))", &env).expect("define add10");
        assert_eq!(run("(add5 1)", &env), Ok(Value::Number(6)));
        assert_eq!(run("(add10 1)", &env), Ok(Value::Number(11)));
    }

    #[test]
    fn sibling_closures_observe_shared_redefinition() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        run("(define shared 1)", &env).expect("define shared");
        run("(define (read-a) shared)", &env).expect("define read-a");
        run("(define (read-b) (+ shared 100))", &env).expect("define read-b");
        assert_eq!(run("(read-a)", &env), Ok(Value::Number(1)));

        run("(define shared 2)", &env).expect("redefine shared");
        assert_eq!(run("(read-a)", &env), Ok(Value::Number(2)));
        assert_eq!(run("(read-b)", &env), Ok(Value::Number(102)));
    }

    #[test]
    fn closures_alias_a_non_root_frame() {
        init_test_logging();
        let root = Environment::new_with_prelude();
        let scope = Environment::child(&root);
        run("(define v 1)", &scope).expect("define v");
        let reader_a = run("(lambda () v)", &scope).expect("first closure");
        let reader_b = run("(lambda () (+ v v))", &scope).expect("second closure");

        run("(define v 5)", &scope).expect("redefine v");
        assert_eq!(apply(reader_a, vec![]), Ok(Value::Number(5)));
        assert_eq!(apply(reader_b, vec![]), Ok(Value::Number(10)));
        assert_eq!(root.borrow().get("v"), None);
    }

    #[test]
    fn define_inside_a_call_binds_in_the_call_frame() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        run("(define n 0)", &env).expect("define n");
        run("(define (bump) (define n 99))", &env).expect("define bump");
        run("(bump)", &env).expect("call bump");
        assert_eq!(run("n", &env), Ok(Value::Number(0)));
    }

    #[test]
    fn recursion_through_root_binding() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        run("(define (twice flag n) (if flag (twice #f (+ n n)) n))", &env)
            .expect("define twice");
        assert_eq!(run("(twice #t 4)", &env), Ok(Value::Number(8)));
    }

    #[test]
    fn end_to_end_scenarios() {
        init_test_logging();
        let env = Environment::new_with_prelude();
        assert_eq!(run("(+ 1 2 3)", &env), Ok(Value::Number(6)));
        assert_eq!(run("(define x 10)", &env), Ok(Value::Unspecified));
        assert_eq!(run("x", &env), Ok(Value::Number(10)));
        run("(define (square n) (+ n n))", &env).expect("define square");
        assert_eq!(run("(square 4)", &env), Ok(Value::Number(8)));
        assert_eq!(run("(if 0 1 2)", &env), Ok(Value::Number(1)));
        assert_eq!(run("(if #f 1 2)", &env), Ok(Value::Number(2)));
        assert_eq!(run("((lambda (a b) (+ a b)) 3 4)", &env), Ok(Value::Number(7)));
        assert_eq!(run("y", &env), Err(LispError::UndefinedSymbol("y".to_string())));
        assert_eq!(run("(+ x 1)", &env), Ok(Value::Number(11)));
    }
}
