//! The interpreter core: value model, reader, evaluator, environments and the built-in registry.

pub mod ast;
pub mod builtins;
pub mod env;
pub mod eval;
pub mod parser;
pub mod special_forms;
