use crate::engine::ast::{NativeFn, NativeFunction, SpecialForm, SpecialFormFn, Value};
use crate::engine::builtins::io::native_print;
use crate::engine::builtins::math::native_add;
use crate::engine::builtins::special_forms::{eval_define, eval_if, eval_lambda};
use crate::engine::env::Environment;
use crate::engine::special_forms as special_form_names;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

const SPECIAL_FORMS: &[(&str, SpecialFormFn)] = &[
    (special_form_names::IF, eval_if),
    (special_form_names::DEFINE, eval_define),
    (special_form_names::LAMBDA, eval_lambda),
];

const NATIVE_FUNCTIONS: &[(&str, NativeFn)] = &[("+", native_add), ("print", native_print)];

/// Populates the given environment with the built-in special forms and procedures.
pub fn populate_globals(env: Rc<RefCell<Environment>>) {
    let mut root_env_borrowed = env.borrow_mut();

    for (name, func) in SPECIAL_FORMS {
        trace!(name = %name, "Registering special form");
        root_env_borrowed.define(
            name.to_string(),
            Value::SpecialForm(SpecialForm {
                name: name.to_string(),
                func: *func,
            }),
        );
    }

    for (name, func) in NATIVE_FUNCTIONS {
        trace!(name = %name, "Registering builtin procedure");
        root_env_borrowed.define(
            name.to_string(),
            Value::Builtin(NativeFunction {
                name: name.to_string(),
                func: *func,
            }),
        );
    }
}
