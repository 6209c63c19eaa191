use std::cell::RefCell;
use std::rc::Rc;

use super::reader::Datum;
use crate::compiler::yail::format_number;
use crate::transport::Value;

/// A user procedure created by `(def (p$name $a …) body…)`.
#[derive(Debug)]
pub struct Procedure {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Datum>,
}

/// Procedures implemented natively and reachable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    DispatchEvent,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::DispatchEvent => "dispatchEvent",
        }
    }
}

/// Runtime value. Lists are shared and mutable, as in Yail.
#[derive(Debug, Clone)]
pub enum Object {
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
    Symbol(String),
    List(Rc<RefCell<Vec<Object>>>),
    Component(String),
    Procedure(Rc<Procedure>),
    Builtin(Builtin),
}

impl Object {
    pub fn list(items: Vec<Object>) -> Self {
        Object::List(Rc::new(RefCell::new(items)))
    }

    /// Everything except `#f` counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false))
    }

    /// Numbers, and text that reads as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Object::Number(n) => Some(*n),
            Object::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Name of a component reference, given as a component, symbol or text.
    pub fn component_name(&self) -> Option<&str> {
        match self {
            Object::Component(name) | Object::Symbol(name) | Object::Text(name) => Some(name),
            _ => None,
        }
    }

    /// Text shown by `string-append` and friends.
    pub fn display(&self) -> String {
        match self {
            Object::Text(s) => s.clone(),
            Object::Number(n) => format_number(*n),
            other => other.to_value().to_string(),
        }
    }

    pub fn from_datum(datum: &Datum) -> Object {
        match datum {
            Datum::Number(n) => Object::Number(*n),
            Datum::Text(s) => Object::Text(s.clone()),
            Datum::Boolean(b) => Object::Boolean(*b),
            Datum::Symbol(s) => Object::Symbol(s.clone()),
            Datum::List(items) => Object::list(items.iter().map(Object::from_datum).collect()),
            Datum::Quote(inner) => Object::from_datum(inner),
        }
    }

    pub fn from_value(value: &Value) -> Object {
        match value {
            Value::Null => Object::Null,
            Value::Boolean(b) => Object::Boolean(*b),
            Value::Number(n) => Object::Number(*n),
            Value::Text(s) => Object::Text(s.clone()),
            Value::Symbol(s) => Object::Symbol(s.clone()),
            Value::List(items) => Object::list(items.iter().map(Object::from_value).collect()),
            Value::Component(name) => Object::Component(name.clone()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Object::Null => Value::Null,
            Object::Boolean(b) => Value::Boolean(*b),
            Object::Number(n) => Value::Number(*n),
            Object::Text(s) => Value::Text(s.clone()),
            Object::Symbol(s) => Value::Symbol(s.clone()),
            Object::List(items) => Value::List(items.borrow().iter().map(Object::to_value).collect()),
            Object::Component(name) => Value::Component(name.clone()),
            Object::Procedure(p) => Value::Symbol(p.name.clone()),
            Object::Builtin(b) => Value::Symbol(b.name().to_string()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Boolean(_) => "boolean",
            Object::Number(_) => "number",
            Object::Text(_) => "text",
            Object::Symbol(_) => "symbol",
            Object::List(_) => "list",
            Object::Component(_) => "component",
            Object::Procedure(_) | Object::Builtin(_) => "procedure",
        }
    }
}
