use std::collections::HashMap;

use super::object::Object;

/// Lexical bindings of one procedure or handler activation, innermost last.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: Vec<(String, Object)>,
}

impl Scope {
    /// Binds `params` to `args`. Missing arguments are null.
    pub fn with_params(params: &[String], args: Vec<Object>) -> Self {
        let mut args = args.into_iter();
        Scope {
            bindings: params
                .iter()
                .map(|p| (p.clone(), args.next().unwrap_or(Object::Null)))
                .collect(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Object> {
        self.bindings.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Rebinds the innermost `name`. False if it is not bound.
    pub fn assign(&mut self, name: &str, value: Object) -> bool {
        match self.bindings.iter_mut().rev().find(|(n, _)| n == name) {
            Some(slot) => {
                slot.1 = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&mut self, name: &str, value: Object) {
        self.bindings.push((name.to_string(), value));
    }

    pub fn pop(&mut self) {
        self.bindings.pop();
    }
}

/// Top-level definitions: `g$` variables, `p$` procedures and builtins.
#[derive(Debug, Default)]
pub struct Globals {
    vars: HashMap<String, Object>,
}

impl Globals {
    pub fn define(&mut self, name: &str, value: Object) {
        self.vars.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Object> {
        self.vars.get(name)
    }

    /// Updates an existing definition. False if `name` was never defined.
    pub fn set(&mut self, name: &str, value: Object) -> bool {
        match self.vars.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}
