use crate::interpreter::{Datum, read_all};

#[test]
fn test_reads_nested_lists() {
    let forms = read_all("(a (b 1) \"c\")").unwrap();
    assert_eq!(
        forms,
        vec![Datum::List(vec![
            Datum::Symbol("a".into()),
            Datum::List(vec![Datum::Symbol("b".into()), Datum::Number(1.0)]),
            Datum::Text("c".into()),
        ])]
    );
}

#[test]
fn test_numbers_and_symbols() {
    let forms = read_all("-5 - +1.5 .5 inf g$x").unwrap();
    assert_eq!(
        forms,
        vec![
            Datum::Number(-5.0),
            Datum::Symbol("-".into()),
            Datum::Number(1.5),
            Datum::Number(0.5),
            Datum::Symbol("inf".into()),
            Datum::Symbol("g$x".into()),
        ]
    );
}

#[test]
fn test_booleans_and_quote() {
    let forms = read_all("#t #f 'Button1").unwrap();
    assert_eq!(
        forms,
        vec![
            Datum::Boolean(true),
            Datum::Boolean(false),
            Datum::Quote(Box::new(Datum::Symbol("Button1".into()))),
        ]
    );
}

#[test]
fn test_string_escapes() {
    let forms = read_all(r#""a\"b\\c\nd""#).unwrap();
    assert_eq!(forms, vec![Datum::Text("a\"b\\c\nd".into())]);
}

#[test]
fn test_comments_are_skipped() {
    let forms = read_all("; header\n1 ; trailing\n2").unwrap();
    assert_eq!(forms, vec![Datum::Number(1.0), Datum::Number(2.0)]);
}

#[test]
fn test_event_header_splits_on_paren() {
    let forms = read_all("(define-event Button1 Click($x)(set-this-form))").unwrap();
    let Datum::List(items) = &forms[0] else {
        panic!("expected a list");
    };
    assert_eq!(items[2], Datum::Symbol("Click".into()));
    assert_eq!(items[3], Datum::List(vec![Datum::Symbol("$x".into())]));
}

#[test]
fn test_unbalanced_input() {
    assert_eq!(read_all("(a (b)").unwrap_err().name, "syntax-error");
    assert_eq!(read_all("a)").unwrap_err().name, "syntax-error");
    assert_eq!(read_all("\"open").unwrap_err().name, "syntax-error");
}

#[test]
fn test_nesting_limit() {
    let deep = format!("{}{}", "(".repeat(600), ")".repeat(600));
    let error = read_all(&deep).unwrap_err();
    assert_eq!(error.name, "syntax-error");

    let quoted = format!("{}x", "'".repeat(600));
    assert_eq!(read_all(&quoted).unwrap_err().name, "syntax-error");

    let shallow = format!("{}{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(read_all(&shallow).unwrap().len(), 1);
}
