//! End-to-end parser scenarios (spec §8 "Concrete scenarios").

use polygrammar::ir::rule::{Grammar, GrammarItem, Rule};
use polygrammar::ir::CharsetGroup;
use polygrammar::{first_parse, parse, BuildOptions, Expr, Runtime, Value};

fn build(items: Vec<GrammarItem>) -> Runtime {
    let grammar = Grammar::new(items).unwrap();
    Runtime::build(&grammar, None, &BuildOptions::default(), None).unwrap()
}

#[test]
fn scenario_1_literal_match_and_mismatch() {
    let rt = build(vec![Rule::new("s", Expr::string("A").unwrap()).into()]);

    let (results, offset) = first_parse(&rt, "A", None, 0).unwrap();
    assert_eq!(offset, 1);
    match &results[0] {
        Value::Node(name, args) => {
            assert_eq!(name, "s");
            assert_eq!(args, &vec![Value::Str("A".to_string())]);
        }
        other => panic!("expected a Node, got {other:?}"),
    }

    let err = first_parse(&rt, "B", None, 0).unwrap_err();
    assert_eq!(err.offset(), 0);
}

#[test]
fn scenario_2_left_recursive_accumulation() {
    // s = "A" s | "!";
    let s = Expr::alt(vec![
        Expr::cat(vec![Expr::string("A").unwrap(), Expr::symbol("s").unwrap()]),
        Expr::string("!").unwrap(),
    ]);
    let rt = build(vec![Rule::new("s", s).into()]);

    let (results, offset) = first_parse(&rt, "AAAA!", None, 0).unwrap();
    assert_eq!(offset, 5);
    assert_eq!(results.len(), 1);

    fn depth(v: &Value) -> usize {
        match v {
            Value::Node(_, args) if args.len() == 2 => 1 + depth(&args[1]),
            Value::Node(_, _) => 0,
            _ => 0,
        }
    }
    assert_eq!(depth(&results[0]), 4);
}

#[test]
fn scenario_3_ambiguous_grammar_enumerates_five_parses_in_order() {
    // s = ("A" s) | ("AA" s) | ("A" EOF);
    let s = Expr::alt(vec![
        Expr::cat(vec![Expr::string("A").unwrap(), Expr::symbol("s").unwrap()]),
        Expr::cat(vec![Expr::string("AA").unwrap(), Expr::symbol("s").unwrap()]),
        Expr::cat(vec![Expr::string("A").unwrap(), Expr::end_of_file()]),
    ]);
    let rt = build(vec![Rule::new("s", s).into()]);
    let solutions = parse(&rt, "AAAAA", None, 0);
    assert_eq!(solutions.len(), 5);
}

#[test]
fn scenario_4_token_concatenation_skips_ignored_separators() {
    // INT = (digit | _sep)+; digit = [0-9]; _sep = [ _];
    let digit = Expr::charset(vec![CharsetGroup::range('0', '9').unwrap()]).unwrap();
    let sep = Expr::charset(vec![CharsetGroup::Char(' '), CharsetGroup::Char('_')]).unwrap();
    let int_rule = Expr::one_or_more(Expr::alt(vec![
        Expr::symbol("digit").unwrap(),
        Expr::symbol("_sep").unwrap(),
    ]));
    let rt = build(vec![
        Rule::new("INT", int_rule).into(),
        Rule::new("digit", digit).into(),
        Rule::new("_sep", sep).into(),
    ]);

    let (results, offset) = first_parse(&rt, "1 234_567", None, 0).unwrap();
    assert_eq!(offset, 9);
    assert_eq!(results, vec![Value::Str("1234567".to_string())]);
}

#[test]
fn scenario_6_error_reports_line_and_column() {
    // s = ("A" | "\n")+ EOF; — the trailing EOF forces full-input
    // validation so a trailing unmatched character surfaces as a failure
    // (spec §9 leaves full-input checking to the caller; this grammar
    // opts in by ending with EndOfFile).
    let body = Expr::cat(vec![
        Expr::one_or_more(Expr::alt(vec![
            Expr::string("A").unwrap(),
            Expr::string("\n").unwrap(),
        ])),
        Expr::end_of_file(),
    ]);
    let rt = build(vec![Rule::new("s", body).into()]);

    let text = "A\nAAB";
    let err = first_parse(&rt, text, None, 0).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("2:3"), "rendered error was: {rendered}");
    assert!(rendered.contains('^'));
}

#[test]
fn end_of_file_only_succeeds_at_the_input_boundary() {
    let rt = build(vec![Rule::new(
        "s",
        Expr::cat(vec![Expr::string("A").unwrap(), Expr::end_of_file()]),
    )
    .into()]);

    assert!(first_parse(&rt, "A", None, 0).is_ok());
    assert!(first_parse(&rt, "AB", None, 0).is_err());
}

#[test]
fn empty_repetition_at_min_zero_yields_the_zero_match_continuation() {
    let rt = build(vec![Rule::new(
        "s",
        Expr::cat(vec![Expr::zero_or_more(Expr::string("A").unwrap()), Expr::end_of_file()]),
    )
    .into()]);

    let (results, offset) = first_parse(&rt, "", None, 0).unwrap();
    assert_eq!(offset, 1);
    assert!(results.is_empty());
}
