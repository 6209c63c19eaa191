use super::{prim, run_yail, run_yail_err};
use crate::transport::Value;

#[test]
fn test_global_definition() {
    assert_eq!(run_yail("(def g$x 5) (get-var g$x)"), Value::Number(5.0));
}

#[test]
fn test_set_global() {
    assert_eq!(run_yail("(def g$x 5) (set-var! g$x 7) (get-var g$x)"), Value::Number(7.0));
}

#[test]
fn test_set_undefined_global() {
    let e = run_yail_err("(set-var! g$missing 1)");
    assert_eq!(e.name, "unbound-variable");
}

#[test]
fn test_unbound_variable() {
    let e = run_yail_err("(get-var g$missing)");
    assert_eq!(e.name, "unbound-variable");
    assert_eq!(e.irritants, vec![Value::Symbol("g$missing".into())]);
}

#[test]
fn test_null_value() {
    assert_eq!(run_yail("*the-null-value*"), Value::Null);
    assert_eq!(run_yail("(begin)"), Value::Null);
}

#[test]
fn test_if_else() {
    assert_eq!(run_yail("(if #t 1 2)"), Value::Number(1.0));
    assert_eq!(run_yail("(if #f 1 2)"), Value::Number(2.0));
    assert_eq!(run_yail("(if #f 1)"), Value::Null);
}

#[test]
fn test_only_false_is_false() {
    assert_eq!(run_yail("(if 0 1 2)"), Value::Number(1.0));
    assert_eq!(run_yail("(if \"\" 1 2)"), Value::Number(1.0));
}

#[test]
fn test_while_counts_up() {
    let src = format!(
        "(def g$n 0) (while {} (set-var! g$n {})) (get-var g$n)",
        prim("<", "(get-var g$n) 5"),
        prim("+", "(get-var g$n) 1")
    );
    assert_eq!(run_yail(&src), Value::Number(5.0));
}

#[test]
fn test_forrange_is_inclusive() {
    let src = format!(
        "(def g$s 0) (forrange $i (set-var! g$s {}) 1 5 1) (get-var g$s)",
        prim("+", "(get-var g$s) (lexical-value $i)")
    );
    assert_eq!(run_yail(&src), Value::Number(15.0));
}

#[test]
fn test_forrange_counts_down() {
    let src = format!(
        "(def g$s 0) (forrange $i (set-var! g$s {}) 3 1 -1) (get-var g$s)",
        prim("+", "(get-var g$s) (lexical-value $i)")
    );
    assert_eq!(run_yail(&src), Value::Number(6.0));
}

#[test]
fn test_forrange_zero_step() {
    let e = run_yail_err("(forrange $i (begin) 1 5 0)");
    assert_eq!(e.name, "bad-range");
}

#[test]
fn test_short_circuit() {
    assert_eq!(run_yail("(and-delayed #f (get-var g$missing))"), Value::Boolean(false));
    assert_eq!(run_yail("(or-delayed #t (get-var g$missing))"), Value::Boolean(true));
    assert_eq!(run_yail("(and-delayed #t #t)"), Value::Boolean(true));
}

#[test]
fn test_procedure_with_result() {
    let src = format!(
        "(def (p$double $x) {}) ((get-var p$double) 21)",
        prim("*", "(lexical-value $x) 2")
    );
    assert_eq!(run_yail(&src), Value::Number(42.0));
}

#[test]
fn test_procedure_arity() {
    let e = run_yail_err("(def (p$one $x) (lexical-value $x)) ((get-var p$one))");
    assert_eq!(e.name, "wrong-number-of-arguments");
}

#[test]
fn test_set_lexical() {
    let src = "(def (p$f $x) (set-lexical! $x 9) (lexical-value $x)) ((get-var p$f) 1)";
    assert_eq!(run_yail(src), Value::Number(9.0));
}

#[test]
fn test_lexical_scope_does_not_leak() {
    let src = "(def (p$f $x) (lexical-value $x)) (def (p$g) (lexical-value $x)) ((get-var p$f) 1) ((get-var p$g))";
    let e = run_yail_err(src);
    assert_eq!(e.name, "unbound-variable");
}

#[test]
fn test_calling_a_non_procedure() {
    let e = run_yail_err("(def g$x 5) ((get-var g$x) 1)");
    assert_eq!(e.name, "not-a-procedure");
}

#[test]
fn test_invoke_by_bare_name() {
    let mut interp = crate::interpreter::Interpreter::new();
    interp
        .eval_source(&format!("(def (p$inc $x) {})", prim("+", "(lexical-value $x) 1")))
        .unwrap();
    assert_eq!(interp.invoke("inc", &[Value::Number(1.0)]).unwrap(), Value::Number(2.0));
    assert_eq!(interp.invoke("p$inc", &[Value::Number(2.0)]).unwrap(), Value::Number(3.0));
}
