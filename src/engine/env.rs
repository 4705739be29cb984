use crate::engine::ast::Value;
use crate::engine::builtins::globals::populate_globals;
use crate::engine::eval::LispError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, trace};

/// One lexical frame. The parent link is set at construction and never changes.
pub struct Environment {
    bindings: HashMap<String, Value>,
    outer: Option<Rc<RefCell<Environment>>>,
}

// Closures in the bindings point back at frames, so only the names are printed.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.bindings.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

impl Environment {
    /// Creates a new, empty root environment without any built-ins.
    pub fn new() -> Rc<RefCell<Self>> {
        debug!("Creating new empty root environment");
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            outer: None,
        }))
    }

    /// Creates the root environment and installs the built-in special forms and procedures.
    pub fn new_with_prelude() -> Rc<RefCell<Self>> {
        debug!("Creating new root environment with prelude");
        let env = Environment::new();
        populate_globals(Rc::clone(&env));
        trace!(env = ?env.borrow(), "Environment after adding prelude");
        env
    }

    /// Creates a frame enclosed by `outer`. Parent bindings are shared, not copied.
    pub fn child(outer: &Rc<RefCell<Environment>>) -> Rc<RefCell<Self>> {
        trace!("Creating new enclosed environment");
        Rc::new(RefCell::new(Environment {
            bindings: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    /// Binds `name` in this frame only, overwriting any previous binding here.
    pub fn define(&mut self, name: String, value: Value) {
        trace!(name = %name, value = ?value, "Defining variable in current environment");
        self.bindings.insert(name, value);
    }

    /// Retrieves the innermost binding of `name`, walking outward through enclosing frames.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.get(name) {
            trace!(name = %name, "Found variable in current environment");
            Some(value.clone())
        } else {
            match &self.outer {
                Some(outer_env) => outer_env.borrow().get(name),
                None => {
                    debug!(name = %name, "Variable not found in any environment");
                    None
                }
            }
        }
    }

    /// Like [`Environment::get`], but a miss is an `UndefinedSymbol` error.
    pub fn lookup(&self, name: &str) -> Result<Value, LispError> {
        self.get(name).ok_or_else(|| {
            error!(symbol_name = %name, "Undefined symbol encountered");
            LispError::UndefinedSymbol(name.to_string())
        })
    }
}
