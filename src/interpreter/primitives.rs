use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::object::Object;
use crate::error::InterpreterException;
use crate::transport::Value;

pub type PrimitiveResult = Result<Object, InterpreterException>;

/// A primitive reachable through `call-yail-primitive`.
#[derive(Clone, Copy)]
pub struct Primitive(pub fn(&[Object]) -> PrimitiveResult);

pub fn builtin_primitives() -> HashMap<&'static str, Primitive> {
    let mut prims = HashMap::new();

    // Arithmetic
    prims.insert("+", Primitive(p_add));
    prims.insert("-", Primitive(p_sub));
    prims.insert("*", Primitive(p_mul));
    prims.insert("yail-divide", Primitive(p_divide));

    // Comparison
    prims.insert("<", Primitive(p_lt));
    prims.insert("<=", Primitive(p_le));
    prims.insert(">", Primitive(p_gt));
    prims.insert(">=", Primitive(p_ge));
    prims.insert("yail-equal?", Primitive(p_equal));
    prims.insert("yail-not-equal?", Primitive(p_not_equal));
    prims.insert("yail-not", Primitive(p_not));

    // Text
    prims.insert("string-append", Primitive(p_string_append));
    prims.insert("string-length", Primitive(p_string_length));

    // Lists
    prims.insert("make-yail-list", Primitive(p_make_list));
    prims.insert("yail-list-add-to-list!", Primitive(p_list_add));
    prims.insert("yail-list-get-item", Primitive(p_list_get));
    prims.insert("yail-list-length", Primitive(p_list_length));
    prims.insert("yail-list-empty?", Primitive(p_list_empty));

    prims
}

fn wrong_type(primitive: &str, arg: &Object) -> InterpreterException {
    InterpreterException::new(
        "wrong-type-argument",
        vec![Value::text(primitive), arg.to_value()],
    )
}

fn arity(primitive: &str, args: &[Object], expected: usize) -> Result<(), InterpreterException> {
    if args.len() == expected {
        return Ok(());
    }
    Err(InterpreterException::new(
        "wrong-number-of-arguments",
        vec![
            Value::text(primitive),
            Value::Number(expected as f64),
            Value::Number(args.len() as f64),
        ],
    ))
}

fn number(primitive: &str, arg: &Object) -> Result<f64, InterpreterException> {
    arg.as_number().ok_or_else(|| wrong_type(primitive, arg))
}

fn list(primitive: &str, arg: &Object) -> Result<Rc<RefCell<Vec<Object>>>, InterpreterException> {
    match arg {
        Object::List(items) => Ok(items.clone()),
        other => Err(wrong_type(primitive, other)),
    }
}

fn binary(primitive: &str, args: &[Object]) -> Result<(f64, f64), InterpreterException> {
    arity(primitive, args, 2)?;
    Ok((number(primitive, &args[0])?, number(primitive, &args[1])?))
}

fn p_add(args: &[Object]) -> PrimitiveResult {
    let mut sum = 0.0;
    for arg in args {
        sum += number("+", arg)?;
    }
    Ok(Object::Number(sum))
}

fn p_mul(args: &[Object]) -> PrimitiveResult {
    let mut product = 1.0;
    for arg in args {
        product *= number("*", arg)?;
    }
    Ok(Object::Number(product))
}

fn p_sub(args: &[Object]) -> PrimitiveResult {
    if let [only] = args {
        return Ok(Object::Number(-number("-", only)?));
    }
    let (a, b) = binary("-", args)?;
    Ok(Object::Number(a - b))
}

fn p_divide(args: &[Object]) -> PrimitiveResult {
    let (a, b) = binary("/", args)?;
    if b == 0.0 {
        return Err(InterpreterException::new(
            "divide-by-zero",
            vec![Value::Number(a), Value::Number(b)],
        ));
    }
    Ok(Object::Number(a / b))
}

fn p_lt(args: &[Object]) -> PrimitiveResult {
    let (a, b) = binary("<", args)?;
    Ok(Object::Boolean(a < b))
}

fn p_le(args: &[Object]) -> PrimitiveResult {
    let (a, b) = binary("<=", args)?;
    Ok(Object::Boolean(a <= b))
}

fn p_gt(args: &[Object]) -> PrimitiveResult {
    let (a, b) = binary(">", args)?;
    Ok(Object::Boolean(a > b))
}

fn p_ge(args: &[Object]) -> PrimitiveResult {
    let (a, b) = binary(">=", args)?;
    Ok(Object::Boolean(a >= b))
}

/// Numbers and numeric text compare by value; everything else structurally.
pub fn yail_equal(a: &Object, b: &Object) -> bool {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x == y;
    }
    match (a, b) {
        (Object::Null, Object::Null) => true,
        (Object::Boolean(x), Object::Boolean(y)) => x == y,
        (Object::Text(x), Object::Text(y)) => x == y,
        (Object::Symbol(x), Object::Symbol(y)) => x == y,
        (Object::Component(x), Object::Component(y)) => x == y,
        (Object::List(x), Object::List(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| yail_equal(a, b))
        }
        (Object::Procedure(x), Object::Procedure(y)) => Rc::ptr_eq(x, y),
        (Object::Builtin(x), Object::Builtin(y)) => x == y,
        _ => false,
    }
}

fn p_equal(args: &[Object]) -> PrimitiveResult {
    arity("=", args, 2)?;
    Ok(Object::Boolean(yail_equal(&args[0], &args[1])))
}

fn p_not_equal(args: &[Object]) -> PrimitiveResult {
    arity("!=", args, 2)?;
    Ok(Object::Boolean(!yail_equal(&args[0], &args[1])))
}

fn p_not(args: &[Object]) -> PrimitiveResult {
    arity("not", args, 1)?;
    match &args[0] {
        Object::Boolean(b) => Ok(Object::Boolean(!b)),
        other => Err(wrong_type("not", other)),
    }
}

fn p_string_append(args: &[Object]) -> PrimitiveResult {
    Ok(Object::Text(args.iter().map(Object::display).collect()))
}

fn p_string_length(args: &[Object]) -> PrimitiveResult {
    arity("length", args, 1)?;
    Ok(Object::Number(args[0].display().chars().count() as f64))
}

fn p_make_list(args: &[Object]) -> PrimitiveResult {
    Ok(Object::list(args.to_vec()))
}

fn p_list_add(args: &[Object]) -> PrimitiveResult {
    let Some((target, items)) = args.split_first() else {
        return Err(InterpreterException::new(
            "wrong-number-of-arguments",
            vec![Value::text("add items to list")],
        ));
    };
    list("add items to list", target)?
        .borrow_mut()
        .extend(items.iter().cloned());
    Ok(Object::Null)
}

/// Indices are 1-based.
fn p_list_get(args: &[Object]) -> PrimitiveResult {
    arity("select list item", args, 2)?;
    let items = list("select list item", &args[0])?;
    let index = number("select list item", &args[1])?;
    let items = items.borrow();
    if index.fract() != 0.0 || index < 1.0 || index as usize > items.len() {
        return Err(InterpreterException::new(
            "index-out-of-range",
            vec![Value::Number(index), Value::Number(items.len() as f64)],
        ));
    }
    Ok(items[index as usize - 1].clone())
}

fn p_list_length(args: &[Object]) -> PrimitiveResult {
    arity("length of list", args, 1)?;
    let items = list("length of list", &args[0])?;
    let len = items.borrow().len();
    Ok(Object::Number(len as f64))
}

fn p_list_empty(args: &[Object]) -> PrimitiveResult {
    arity("is list empty?", args, 1)?;
    let items = list("is list empty?", &args[0])?;
    let empty = items.borrow().is_empty();
    Ok(Object::Boolean(empty))
}
