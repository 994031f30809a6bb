//! The optimizer pipeline end to end, through `Runtime::build` (spec §4.2).
//! Unit tests inside `src/optimizer/*` cover each pass in isolation; these
//! confirm the passes compose correctly and preserve the language.

use polygrammar::ir::rule::{Grammar, GrammarItem, Rule};
use polygrammar::ir::transform::has_inner_node;
use polygrammar::{first_parse, BuildOptions, Expr, ExprKind, Runtime, Value};

fn build(items: Vec<GrammarItem>) -> Runtime {
    let grammar = Grammar::new(items).unwrap();
    Runtime::build(&grammar, None, &BuildOptions::default(), None).unwrap()
}

#[test]
fn inlining_does_not_change_what_the_grammar_accepts() {
    // s = greeting "!"; greeting = "hello" | "hi";
    let s = Expr::cat(vec![
        Expr::symbol("greeting").unwrap(),
        Expr::string("!").unwrap(),
    ]);
    let greeting = Expr::alt(vec![
        Expr::string("hello").unwrap(),
        Expr::string("hi").unwrap(),
    ]);
    let rt = build(vec![
        Rule::new("s", s).into(),
        Rule::new("greeting", greeting).into(),
    ]);

    // `greeting` has no bound visitor method, so it is inlined away.
    assert!(!has_inner_node(rt.rule("s").unwrap(), |n| {
        matches!(&n.kind, ExprKind::Symbol(name) if name == "greeting")
    }));

    assert!(first_parse(&rt, "hello!", None, 0).is_ok());
    assert!(first_parse(&rt, "hi!", None, 0).is_ok());
    assert!(first_parse(&rt, "bye!", None, 0).is_err());
}

#[test]
fn token_tagged_rule_with_no_symbols_becomes_a_single_regexp_match() {
    // INT = [0-9]+;
    let digit = Expr::charset(vec![polygrammar::CharsetGroup::range('0', '9').unwrap()]).unwrap();
    let rt = build(vec![Rule::new("INT", Expr::one_or_more(digit)).into()]);

    match &rt.rule("INT").unwrap().kind {
        ExprKind::Regexp(pattern) => assert_eq!(pattern, "[0-9]+"),
        other => panic!("expected Regexp after optimization, got {other:?}"),
    }

    let (results, offset) = first_parse(&rt, "42", None, 0).unwrap();
    assert_eq!(offset, 2);
    assert_eq!(results, vec![Value::Str("42".to_string())]);
}

#[test]
fn string_to_charset_promotion_feeds_coalescing() {
    // s = "a" | "b" | "c";
    let s = Expr::alt(vec![
        Expr::string("a").unwrap(),
        Expr::string("b").unwrap(),
        Expr::string("c").unwrap(),
    ]);
    let rt = build(vec![Rule::new("s", s).into()]);
    match &rt.rule("s").unwrap().kind {
        ExprKind::Charset(groups) => assert_eq!(groups.len(), 3),
        other => panic!("expected single-character alternatives coalesced into one Charset, got {other:?}"),
    }
    assert!(first_parse(&rt, "b", None, 0).is_ok());
}

#[test]
fn empty_elimination_survives_a_direct_self_reference() {
    // s = "A" s | ""; — a rule that can match nothing, recursively.
    let s = Expr::alt(vec![
        Expr::cat(vec![Expr::string("A").unwrap(), Expr::symbol("s").unwrap()]),
        Expr::empty(),
    ]);
    let rt = build(vec![Rule::new("s", s).into()]);
    assert!(first_parse(&rt, "", None, 0).is_ok());
    assert!(first_parse(&rt, "AAA", None, 0).is_ok());
}
