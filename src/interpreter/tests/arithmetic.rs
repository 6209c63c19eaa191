use super::{prim, run_yail, run_yail_err};
use crate::transport::Value;

#[test]
fn test_add_is_variadic() {
    let src = "(call-yail-primitive + (*list-for-runtime* 1 2 3) '(number number number) \"+\")";
    assert_eq!(run_yail(src), Value::Number(6.0));
}

#[test]
fn test_subtract_and_negate() {
    assert_eq!(run_yail(&prim("-", "10 4")), Value::Number(6.0));
    assert_eq!(run_yail(&prim("-", "3")), Value::Number(-3.0));
}

#[test]
fn test_multiply_empty_is_one() {
    assert_eq!(run_yail(&prim("*", "")), Value::Number(1.0));
}

#[test]
fn test_divide() {
    assert_eq!(run_yail(&prim("yail-divide", "9 2")), Value::Number(4.5));
}

#[test]
fn test_divide_by_zero() {
    let e = run_yail_err(&prim("yail-divide", "1 0"));
    assert_eq!(e.name, "divide-by-zero");
}

#[test]
fn test_numeric_text_is_a_number() {
    assert_eq!(run_yail(&prim("+", "\"2\" 3")), Value::Number(5.0));
}

#[test]
fn test_non_numeric_text_is_rejected() {
    let e = run_yail_err(&prim("+", "\"abc\" 1"));
    assert_eq!(e.name, "wrong-type-argument");
    assert_eq!(e.irritants[1], Value::text("abc"));
}

#[test]
fn test_comparisons() {
    assert_eq!(run_yail(&prim("<", "1 2")), Value::Boolean(true));
    assert_eq!(run_yail(&prim("<=", "2 2")), Value::Boolean(true));
    assert_eq!(run_yail(&prim(">", "1 2")), Value::Boolean(false));
    assert_eq!(run_yail(&prim(">=", "1 2")), Value::Boolean(false));
}

#[test]
fn test_yail_equal_compares_numeric_text_by_value() {
    assert_eq!(run_yail(&prim("yail-equal?", "\"1.0\" 1")), Value::Boolean(true));
    assert_eq!(run_yail(&prim("yail-equal?", "\"a\" \"b\"")), Value::Boolean(false));
    assert_eq!(run_yail(&prim("yail-not-equal?", "\"a\" \"b\"")), Value::Boolean(true));
}

#[test]
fn test_comparison_arity() {
    let e = run_yail_err(&prim("<", "1"));
    assert_eq!(e.name, "wrong-number-of-arguments");
}

#[test]
fn test_string_append_displays_numbers() {
    assert_eq!(run_yail(&prim("string-append", "\"n=\" 3 \"!\"")), Value::text("n=3!"));
    assert_eq!(run_yail(&prim("string-length", "\"hello\"")), Value::Number(5.0));
}
