use super::{prim, run_yail, run_yail_err};
use crate::transport::Value;

fn make_list(items: &str) -> String {
    prim("make-yail-list", items)
}

#[test]
fn test_make_list() {
    assert_eq!(
        run_yail(&make_list("1 \"a\" #t")),
        Value::List(vec![Value::Number(1.0), Value::text("a"), Value::Boolean(true)])
    );
}

#[test]
fn test_get_item_is_one_based() {
    let src = prim("yail-list-get-item", &format!("{} 2", make_list("10 20 30")));
    assert_eq!(run_yail(&src), Value::Number(20.0));
}

#[test]
fn test_get_item_out_of_range() {
    let src = prim("yail-list-get-item", &format!("{} 3", make_list("10 20")));
    assert_eq!(run_yail_err(&src).name, "index-out-of-range");
    let src = prim("yail-list-get-item", &format!("{} 0", make_list("10 20")));
    assert_eq!(run_yail_err(&src).name, "index-out-of-range");
}

#[test]
fn test_add_items_mutates_the_shared_list() {
    let src = format!(
        "(def g$l {}) {} {}",
        make_list("1"),
        prim("yail-list-add-to-list!", "(get-var g$l) 2 3"),
        prim("yail-list-length", "(get-var g$l)")
    );
    assert_eq!(run_yail(&src), Value::Number(3.0));
}

#[test]
fn test_is_empty() {
    assert_eq!(run_yail(&prim("yail-list-empty?", &make_list(""))), Value::Boolean(true));
    assert_eq!(run_yail(&prim("yail-list-empty?", &make_list("1"))), Value::Boolean(false));
}

#[test]
fn test_foreach_sums() {
    let src = format!(
        "(def g$s 0) (foreach $item (set-var! g$s {}) {}) (get-var g$s)",
        prim("+", "(get-var g$s) (lexical-value $item)"),
        make_list("1 2 3 4")
    );
    assert_eq!(run_yail(&src), Value::Number(10.0));
}

#[test]
fn test_foreach_over_non_list() {
    let e = run_yail_err("(foreach $item (begin) 5)");
    assert_eq!(e.name, "wrong-type-argument");
}

#[test]
fn test_length_of_non_list() {
    let e = run_yail_err(&prim("yail-list-length", "5"));
    assert_eq!(e.name, "wrong-type-argument");
}
