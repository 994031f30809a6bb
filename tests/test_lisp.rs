//! The Lisp surface end to end (spec §6): parsing grammar source text and
//! building a runnable `Runtime` from the result, round-tripping through
//! the writer, and the error paths a malformed surface program hits.

use polygrammar::{first_parse, BuildOptions, ExprKind, Runtime};

#[test]
fn a_lisp_grammar_builds_and_parses() {
    let source = r#"
        (grammar
            (rule s (one_or_more (symbol digit)))
            (rule digit #token (charset (char_range "0" "9"))))
    "#;
    let grammar = polygrammar::lisp::parse_grammar(source).unwrap();
    let rt = Runtime::build(&grammar, None, &BuildOptions::default(), None).unwrap();
    assert!(first_parse(&rt, "12345", None, 0).is_ok());
    assert!(first_parse(&rt, "", None, 0).is_err());
}

#[test]
fn annotations_and_aliases_round_trip_through_write_then_read() {
    let source = r#"(grammar (rule s #token (+ (| (string "a") (string "b")))))"#;
    let grammar = polygrammar::lisp::parse_grammar(source).unwrap();
    let text = polygrammar::lisp::write_grammar(&grammar);
    let reparsed = polygrammar::lisp::parse_grammar(&text).unwrap();

    let polygrammar::ir::rule::GrammarItem::Rule(original) = &grammar.items()[0] else {
        panic!("expected a rule");
    };
    let polygrammar::ir::rule::GrammarItem::Rule(round_tripped) = &reparsed.items()[0] else {
        panic!("expected a rule");
    };
    assert_eq!(original.expr, round_tripped.expr);
    assert!(round_tripped.expr.meta().is_token());
}

#[test]
fn charset_diff_round_trips_and_evaluates() {
    let source = r#"
        (grammar
            (rule s (charset_diff (charset (char_range "a" "z")) (charset (char "m")))))
    "#;
    let grammar = polygrammar::lisp::parse_grammar(source).unwrap();
    let rt = Runtime::build(&grammar, None, &BuildOptions::default(), None).unwrap();
    match &rt.rule("s").unwrap().kind {
        ExprKind::Charset(groups) => assert_eq!(groups.len(), 2),
        other => panic!("expected subtraction to fold into one Charset, got {other:?}"),
    }
    assert!(first_parse(&rt, "n", None, 0).is_ok());
    assert!(first_parse(&rt, "m", None, 0).is_err());
}

#[test]
fn unterminated_string_is_a_reader_error() {
    let err = polygrammar::lisp::parse_grammar(r#"(grammar (rule s (string "a)))"#).unwrap_err();
    assert!(matches!(err, polygrammar::lisp::LispError::UnterminatedString(_)));
}

#[test]
fn trailing_data_after_the_grammar_form_is_rejected() {
    let err = polygrammar::lisp::parse_grammar(r#"(grammar (rule s (string "a"))) garbage"#).unwrap_err();
    assert!(matches!(err, polygrammar::lisp::LispError::TrailingData));
}

#[test]
fn named_and_numeric_unicode_escapes_in_string_literals() {
    let source = "(grammar (rule s (string \"tab\\there\\u00e9\")))";
    let grammar = polygrammar::lisp::parse_grammar(source).unwrap();
    let polygrammar::ir::rule::GrammarItem::Rule(rule) = &grammar.items()[0] else {
        panic!("expected a rule");
    };
    assert!(matches!(&rule.expr.kind, ExprKind::String(s) if s == "tab\there\u{e9}"));
}
