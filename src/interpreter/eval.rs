use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::environment::{Globals, Scope};
use super::form::Form;
use super::object::{Builtin, Object, Procedure};
use super::primitives::{Primitive, builtin_primitives};
use super::reader::{Datum, read_all};
use crate::error::InterpreterException;
use crate::transport::{Request, Value};

/// Procedure calls and event handlers nested deeper than this raise
/// `stack-overflow`.
const MAX_CALL_DEPTH: usize = 200;

/// Bound on nested form evaluation across all active calls. Keeps the
/// interpreter thread's stack from overflowing on deep code.
const MAX_NESTING: usize = 1000;

const NULL_SYMBOL: &str = "*the-null-value*";

type EvalResult = Result<Object, InterpreterException>;

#[derive(Debug)]
struct Handler {
    params: Vec<String>,
    body: Vec<Datum>,
}

fn bad_syntax(form: &str) -> InterpreterException {
    InterpreterException::new("bad-syntax", vec![Value::text(form)])
}

fn unbound(name: &str) -> InterpreterException {
    InterpreterException::new("unbound-variable", vec![Value::Symbol(name.to_string())])
}

fn stack_overflow(culprit: impl Into<String>) -> InterpreterException {
    InterpreterException::new("stack-overflow", vec![Value::Symbol(culprit.into())])
}

fn wrong_type(form: &str, value: &Object) -> InterpreterException {
    InterpreterException::new("wrong-type-argument", vec![Value::text(form), value.to_value()])
}

/// Evaluates the Yail subset emitted by the block compiler.
///
/// Owns the global environment, the registered event handlers and the form.
/// State persists across requests, so a handler defined by one bundle can
/// be raised by a later request.
pub struct Interpreter {
    globals: Globals,
    handlers: HashMap<(String, String), Rc<Handler>>,
    primitives: HashMap<&'static str, Primitive>,
    form: Form,
    depth: usize,
    nesting: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let mut globals = Globals::default();
        let dispatch = Builtin::DispatchEvent;
        globals.define(dispatch.name(), Object::Builtin(dispatch));
        Interpreter {
            globals,
            handlers: HashMap::new(),
            primitives: builtin_primitives(),
            form: Form::new(),
            depth: 0,
            nesting: 0,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn has_handler(&self, component: &str, event: &str) -> bool {
        self.handlers
            .contains_key(&(component.to_string(), event.to_string()))
    }

    pub fn run(&mut self, request: Request) -> Result<Value, InterpreterException> {
        self.reset_depth();
        match request {
            Request::Execute { code } => self.eval_source(&code),
            Request::Invoke { procedure, args } => self.invoke(&procedure, &args),
            Request::Raise {
                component,
                event,
                args,
            } => {
                let args = args.iter().map(Object::from_value).collect();
                let target = Object::Component(component.clone());
                self.dispatch_event(&target, &component, &event, args)
                    .map(Value::Boolean)
            }
        }
    }

    /// Evaluates every form in order and returns the last value.
    pub fn eval_source(&mut self, code: &str) -> Result<Value, InterpreterException> {
        let forms = read_all(code)?;
        let mut scope = Scope::default();
        let mut last = Object::Null;
        for form in &forms {
            self.reset_depth();
            last = self.eval(form, &mut scope)?;
        }
        Ok(last.to_value())
    }

    /// Calls a global procedure. `name` may omit the `p$` prefix.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, InterpreterException> {
        let procedure = self
            .globals
            .get(name)
            .or_else(|| self.globals.get(&format!("p${}", name)))
            .cloned()
            .ok_or_else(|| unbound(name))?;
        self.reset_depth();
        let args = args.iter().map(Object::from_value).collect();
        Ok(self.apply(procedure, args)?.to_value())
    }

    /// Runs the handler registered for `component_name`/`event`.
    /// Returns false when no handler is registered.
    pub fn dispatch_event(
        &mut self,
        component: &Object,
        component_name: &str,
        event: &str,
        args: Vec<Object>,
    ) -> Result<bool, InterpreterException> {
        let key = (component_name.to_string(), event.to_string());
        let Some(handler) = self.handlers.get(&key).cloned() else {
            debug!("no handler for {}.{}", component_name, event);
            return Ok(false);
        };
        if self.depth >= MAX_CALL_DEPTH {
            return Err(stack_overflow(format!("{}.{}", component_name, event)));
        }
        debug!("dispatching {}.{} from {}", component_name, event, component.display());
        self.depth += 1;
        let mut scope = Scope::with_params(&handler.params, args);
        let result = self.eval_body(&handler.body, &mut scope);
        self.depth -= 1;
        result.map(|_| true)
    }

    fn reset_depth(&mut self) {
        self.depth = 0;
        self.nesting = 0;
    }

    fn eval(&mut self, datum: &Datum, scope: &mut Scope) -> EvalResult {
        match datum {
            Datum::Number(n) => Ok(Object::Number(*n)),
            Datum::Text(s) => Ok(Object::Text(s.clone())),
            Datum::Boolean(b) => Ok(Object::Boolean(*b)),
            Datum::Quote(inner) => Ok(Object::from_datum(inner)),
            Datum::Symbol(name) => self.lookup(name, scope),
            Datum::List(items) => {
                if self.nesting >= MAX_NESTING {
                    return Err(stack_overflow("eval"));
                }
                self.nesting += 1;
                let result = self.eval_list(items, scope);
                self.nesting -= 1;
                result
            }
        }
    }

    fn eval_list(&mut self, items: &[Datum], scope: &mut Scope) -> EvalResult {
        let Some((head, rest)) = items.split_first() else {
            return Ok(Object::Null);
        };
        if let Datum::Symbol(name) = head {
            if let Some(result) = self.special_form(name, rest, scope) {
                return result;
            }
        }
        let callee = self.eval(head, scope)?;
        let mut args = Vec::with_capacity(rest.len());
        for arg in rest {
            args.push(self.eval(arg, scope)?);
        }
        self.apply(callee, args)
    }

    fn eval_body(&mut self, body: &[Datum], scope: &mut Scope) -> EvalResult {
        let mut last = Object::Null;
        for form in body {
            last = self.eval(form, scope)?;
        }
        Ok(last)
    }

    fn lookup(&self, name: &str, scope: &Scope) -> EvalResult {
        if name == NULL_SYMBOL {
            return Ok(Object::Null);
        }
        scope
            .lookup(name)
            .or_else(|| self.globals.get(name))
            .cloned()
            .ok_or_else(|| unbound(name))
    }

    fn special_form(&mut self, name: &str, rest: &[Datum], scope: &mut Scope) -> Option<EvalResult> {
        let result = match name {
            "def" => self.define(rest, scope),
            "define-event" => self.define_event(rest),
            "begin" => self.eval_body(rest, scope),
            "if" => self.eval_if(rest, scope),
            "while" => self.eval_while(rest, scope),
            "forrange" => self.eval_forrange(rest, scope),
            "foreach" => self.eval_foreach(rest, scope),
            "and-delayed" => self.eval_and(rest, scope),
            "or-delayed" => self.eval_or(rest, scope),
            "quote" => match rest {
                [datum] => Ok(Object::from_datum(datum)),
                _ => Err(bad_syntax("quote")),
            },
            "get-var" => match rest {
                [Datum::Symbol(var)] => self.globals.get(var).cloned().ok_or_else(|| unbound(var)),
                _ => Err(bad_syntax("get-var")),
            },
            "set-var!" => self.set_global(rest, scope),
            "lexical-value" => match rest {
                [Datum::Symbol(var)] => scope.lookup(var).cloned().ok_or_else(|| unbound(var)),
                _ => Err(bad_syntax("lexical-value")),
            },
            "set-lexical!" => self.set_lexical(rest, scope),
            "*list-for-runtime*" => self.eval_args(rest, scope).map(Object::list),
            "call-yail-primitive" => self.call_primitive(rest, scope),
            "set-this-form" => Ok(Object::Null),
            "get-component" => match rest {
                [Datum::Symbol(component)] => {
                    self.form.component(component);
                    Ok(Object::Component(component.clone()))
                }
                _ => Err(bad_syntax("get-component")),
            },
            "set-and-coerce-property!" => self.set_property(rest, scope),
            "get-property" => self.get_property(rest, scope),
            "call-component-method" => self.call_method(rest, scope),
            _ => return None,
        };
        Some(result)
    }

    fn eval_args(&mut self, args: &[Datum], scope: &mut Scope) -> Result<Vec<Object>, InterpreterException> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval(arg, scope)?);
        }
        Ok(values)
    }

    fn define(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        match rest {
            [Datum::Symbol(var), value] => {
                let value = self.eval(value, scope)?;
                self.globals.define(var, value);
                Ok(Object::Null)
            }
            [Datum::List(head), body @ ..] => {
                let Some((Datum::Symbol(name), params)) = head.split_first() else {
                    return Err(bad_syntax("def"));
                };
                let params = params
                    .iter()
                    .map(|p| match p {
                        Datum::Symbol(p) => Ok(p.clone()),
                        _ => Err(bad_syntax("def")),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let procedure = Procedure {
                    name: name.clone(),
                    params,
                    body: body.to_vec(),
                };
                self.globals.define(name, Object::Procedure(Rc::new(procedure)));
                Ok(Object::Null)
            }
            _ => Err(bad_syntax("def")),
        }
    }

    fn define_event(&mut self, rest: &[Datum]) -> EvalResult {
        let [Datum::Symbol(component), Datum::Symbol(event), Datum::List(params), body @ ..] = rest else {
            return Err(bad_syntax("define-event"));
        };
        let params = params
            .iter()
            .filter_map(|p| match p {
                Datum::Symbol(p) => Some(p.clone()),
                _ => None,
            })
            .collect();
        debug!("registered handler {}.{}", component, event);
        self.form.component(component);
        self.handlers.insert(
            (component.clone(), event.clone()),
            Rc::new(Handler {
                params,
                body: body.to_vec(),
            }),
        );
        Ok(Object::Null)
    }

    fn eval_if(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        match rest {
            [test, then] => {
                if self.eval(test, scope)?.is_truthy() {
                    self.eval(then, scope)
                } else {
                    Ok(Object::Null)
                }
            }
            [test, then, otherwise] => {
                if self.eval(test, scope)?.is_truthy() {
                    self.eval(then, scope)
                } else {
                    self.eval(otherwise, scope)
                }
            }
            _ => Err(bad_syntax("if")),
        }
    }

    fn eval_while(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let Some((test, body)) = rest.split_first() else {
            return Err(bad_syntax("while"));
        };
        while self.eval(test, scope)?.is_truthy() {
            self.eval_body(body, scope)?;
        }
        Ok(Object::Null)
    }

    fn number(&mut self, form: &str, datum: &Datum, scope: &mut Scope) -> Result<f64, InterpreterException> {
        let value = self.eval(datum, scope)?;
        value.as_number().ok_or_else(|| wrong_type(form, &value))
    }

    fn eval_forrange(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let [Datum::Symbol(var), body, start, end, step] = rest else {
            return Err(bad_syntax("forrange"));
        };
        let start = self.number("forrange", start, scope)?;
        let end = self.number("forrange", end, scope)?;
        let step = self.number("forrange", step, scope)?;
        if step == 0.0 {
            return Err(InterpreterException::new(
                "bad-range",
                vec![Value::Number(start), Value::Number(end), Value::Number(step)],
            ));
        }
        let mut i = start;
        while (step > 0.0 && i <= end) || (step < 0.0 && i >= end) {
            scope.push(var, Object::Number(i));
            let result = self.eval(body, scope);
            scope.pop();
            result?;
            i += step;
        }
        Ok(Object::Null)
    }

    fn eval_foreach(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let [Datum::Symbol(var), body, list] = rest else {
            return Err(bad_syntax("foreach"));
        };
        let items = match self.eval(list, scope)? {
            Object::List(items) => items.borrow().clone(),
            other => return Err(wrong_type("foreach", &other)),
        };
        for item in items {
            scope.push(var, item);
            let result = self.eval(body, scope);
            scope.pop();
            result?;
        }
        Ok(Object::Null)
    }

    fn eval_and(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        for operand in rest {
            if !self.eval(operand, scope)?.is_truthy() {
                return Ok(Object::Boolean(false));
            }
        }
        Ok(Object::Boolean(true))
    }

    fn eval_or(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        for operand in rest {
            if self.eval(operand, scope)?.is_truthy() {
                return Ok(Object::Boolean(true));
            }
        }
        Ok(Object::Boolean(false))
    }

    fn set_global(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let [Datum::Symbol(var), value] = rest else {
            return Err(bad_syntax("set-var!"));
        };
        let value = self.eval(value, scope)?;
        if !self.globals.set(var, value) {
            return Err(unbound(var));
        }
        Ok(Object::Null)
    }

    fn set_lexical(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let [Datum::Symbol(var), value] = rest else {
            return Err(bad_syntax("set-lexical!"));
        };
        let value = self.eval(value, scope)?;
        if !scope.assign(var, value) {
            return Err(unbound(var));
        }
        Ok(Object::Null)
    }

    /// `(call-yail-primitive NAME ARGS 'TYPES "label")`
    fn call_primitive(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let [Datum::Symbol(name), args, ..] = rest else {
            return Err(bad_syntax("call-yail-primitive"));
        };
        let primitive = *self.primitives.get(name.as_str()).ok_or_else(|| unbound(name))?;
        let args = match self.eval(args, scope)? {
            Object::List(items) => items.borrow().clone(),
            other => return Err(wrong_type(name, &other)),
        };
        (primitive.0)(&args)
    }

    fn component_arg(&mut self, form: &str, datum: &Datum, scope: &mut Scope) -> Result<String, InterpreterException> {
        let value = self.eval(datum, scope)?;
        value
            .component_name()
            .map(str::to_string)
            .ok_or_else(|| wrong_type(form, &value))
    }

    fn set_property(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let [component, property, value, kind] = rest else {
            return Err(bad_syntax("set-and-coerce-property!"));
        };
        let component = self.component_arg("set-and-coerce-property!", component, scope)?;
        let property = self.component_arg("set-and-coerce-property!", property, scope)?;
        let value = self.eval(value, scope)?;
        let kind = self.eval(kind, scope)?;
        let value = coerce(&value, kind.component_name().unwrap_or("any"))?;
        self.form.set_property(&component, &property, value);
        Ok(Object::Null)
    }

    fn get_property(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let [component, property] = rest else {
            return Err(bad_syntax("get-property"));
        };
        let component = self.component_arg("get-property", component, scope)?;
        let property = self.component_arg("get-property", property, scope)?;
        Ok(self
            .form
            .property(&component, &property)
            .map(Object::from_value)
            .unwrap_or(Object::Null))
    }

    fn call_method(&mut self, rest: &[Datum], scope: &mut Scope) -> EvalResult {
        let [component, method, args, ..] = rest else {
            return Err(bad_syntax("call-component-method"));
        };
        let component = self.component_arg("call-component-method", component, scope)?;
        let method = self.component_arg("call-component-method", method, scope)?;
        let args = match self.eval(args, scope)? {
            Object::List(items) => items.borrow().iter().map(Object::to_value).collect(),
            other => return Err(wrong_type("call-component-method", &other)),
        };
        self.form.call_method(&component, &method, args);
        Ok(Object::Null)
    }

    fn apply(&mut self, callee: Object, args: Vec<Object>) -> EvalResult {
        match callee {
            Object::Procedure(procedure) => {
                if args.len() != procedure.params.len() {
                    return Err(InterpreterException::new(
                        "wrong-number-of-arguments",
                        vec![
                            Value::Symbol(procedure.name.clone()),
                            Value::Number(procedure.params.len() as f64),
                            Value::Number(args.len() as f64),
                        ],
                    ));
                }
                if self.depth >= MAX_CALL_DEPTH {
                    return Err(stack_overflow(procedure.name.clone()));
                }
                self.depth += 1;
                let mut scope = Scope::with_params(&procedure.params, args);
                let result = self.eval_body(&procedure.body, &mut scope);
                self.depth -= 1;
                result
            }
            Object::Builtin(Builtin::DispatchEvent) => {
                let [component, component_name, event, event_args] = args.as_slice() else {
                    return Err(InterpreterException::new(
                        "wrong-number-of-arguments",
                        vec![Value::Symbol("dispatchEvent".to_string())],
                    ));
                };
                let component_name = component_name
                    .component_name()
                    .ok_or_else(|| wrong_type("dispatchEvent", component_name))?
                    .to_string();
                let event = event
                    .component_name()
                    .ok_or_else(|| wrong_type("dispatchEvent", event))?
                    .to_string();
                let event_args = match event_args {
                    Object::List(items) => items.borrow().clone(),
                    Object::Null => Vec::new(),
                    other => return Err(wrong_type("dispatchEvent", other)),
                };
                let component = component.clone();
                self.dispatch_event(&component, &component_name, &event, event_args)
                    .map(Object::Boolean)
            }
            other => Err(InterpreterException::new("not-a-procedure", vec![other.to_value()])),
        }
    }
}

/// Coerces a property value to the declared property type.
fn coerce(value: &Object, kind: &str) -> Result<Value, InterpreterException> {
    let failed = || {
        InterpreterException::new(
            "coercion-failure",
            vec![value.to_value(), Value::Symbol(kind.to_string())],
        )
    };
    match kind {
        "text" => Ok(Value::Text(value.display())),
        "number" => value.as_number().map(Value::Number).ok_or_else(failed),
        "boolean" => match value {
            Object::Boolean(b) => Ok(Value::Boolean(*b)),
            _ => Err(failed()),
        },
        _ => Ok(value.to_value()),
    }
}
