//! Reference Yail interpreter.
//!
//! Runs the code the block compiler emits: global and lexical variables,
//! procedures, control forms, the `call-yail-primitive` table, component
//! properties and event handlers. [`InterpreterHandle`] puts one on a
//! dedicated thread so it can serve a transport.

mod reader;
pub use reader::{Datum, read_all};

mod object;
pub use object::Object;

mod environment;

mod form;
pub use form::{Component, Form, MAX_RECORDED_CALLS};

mod primitives;

mod eval;
pub use eval::Interpreter;

mod handle;
pub use handle::InterpreterHandle;

#[cfg(test)]
mod tests;
