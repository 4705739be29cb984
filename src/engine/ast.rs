use crate::engine::env::Environment;
use crate::engine::eval::LispError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A user-defined procedure produced by `lambda` or the `(define (f ...) ...)` shorthand.
#[derive(Clone)]
pub struct Closure {
    pub params: Vec<String>,
    pub body: Box<Value>,
    pub env: Rc<RefCell<Environment>>,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &self.body)
            .field("env", &"<captured_env>") // Avoid printing the whole env
            .finish()
    }
}

// Closures are equal if their parameters and body are structurally equal
// and they share the same captured frame.
impl PartialEq for Closure {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.body == other.body && Rc::ptr_eq(&self.env, &other.env)
    }
}

/// A host procedure. Receives its arguments already evaluated.
pub type NativeFn = fn(Vec<Value>) -> Result<Value, LispError>;

/// A host special form. Receives the unevaluated operands and the calling environment.
pub type SpecialFormFn = fn(&[Value], Rc<RefCell<Environment>>) -> Result<Value, LispError>;

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String, // For debugging and identification
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("func", &"<native_fn_ptr>")
            .finish()
    }
}

// Registry names are unique, so the name identifies the function.
impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Clone)]
pub struct SpecialForm {
    pub name: String,
    pub func: SpecialFormFn,
}

impl fmt::Debug for SpecialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecialForm")
            .field("name", &self.name)
            .field("func", &"<special_form_fn_ptr>")
            .finish()
    }
}

impl PartialEq for SpecialForm {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Atom(String),
    Number(i64),
    Bool(bool),
    List(Vec<Value>),
    Builtin(NativeFunction),
    SpecialForm(SpecialForm),
    Closure(Closure),
    /// Result of forms that produce no value (`define`, `print`, a one-armed `if`).
    Unspecified,
}

impl Value {
    /// Only `#f` is false. Zero, the empty list and `Unspecified` are all true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false))
    }

    /// Short kind name used in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Atom(_) => "Atom",
            Value::Number(_) => "Number",
            Value::Bool(_) => "Bool",
            Value::List(_) => "List",
            Value::Builtin(_) => "Builtin",
            Value::SpecialForm(_) => "SpecialForm",
            Value::Closure(_) => "Closure",
            Value::Unspecified => "Unspecified",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Atom(name) => write!(f, "{}", name),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(true) => write!(f, "#t"),
            Value::Bool(false) => write!(f, "#f"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Closure(_) => write!(f, "<procedure>"),
            Value::Builtin(_) => write!(f, "<builtin-procedure>"),
            Value::SpecialForm(_) => write!(f, "<special-form>"),
            Value::Unspecified => Ok(()),
        }
    }
}
