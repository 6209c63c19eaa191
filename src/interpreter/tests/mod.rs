use crate::error::InterpreterException;
use crate::interpreter::Interpreter;
use crate::transport::Value;

mod arithmetic;
mod control_flow;
mod lists;
mod reader;

pub fn run_yail(source: &str) -> Value {
    let mut interp = Interpreter::new();
    match interp.eval_source(source) {
        Ok(value) => value,
        Err(e) => panic!("evaluation of {:?} failed: {}", source, e),
    }
}

pub fn run_yail_err(source: &str) -> InterpreterException {
    let mut interp = Interpreter::new();
    match interp.eval_source(source) {
        Ok(value) => panic!("expected {:?} to fail, got {}", source, value),
        Err(e) => e,
    }
}

/// `(call-yail-primitive NAME (*list-for-runtime* ARGS) '() "NAME")`
pub fn prim(name: &str, args: &str) -> String {
    format!(
        "(call-yail-primitive {} (*list-for-runtime* {}) '() \"{}\")",
        name, args, name
    )
}
