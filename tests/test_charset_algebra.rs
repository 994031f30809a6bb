//! Charset subtraction scenarios (spec §8 "Charset algebra"), run through
//! the full optimizer pipeline rather than `subtract_groups` directly, so
//! the table also exercises string/charset promotion ordering.

use test_case::test_case;

use polygrammar::ir::CharsetGroup;
use polygrammar::ir::rule::{Grammar, GrammarItem, Rule};
use polygrammar::{BuildOptions, Expr, Runtime};

fn single_charset(rt: &Runtime, name: &str) -> Vec<CharsetGroup> {
    match &rt.rule(name).unwrap().kind {
        polygrammar::ExprKind::Charset(groups) => groups.clone(),
        other => panic!("expected Charset, got {other:?}"),
    }
}

fn build_diff(base: Expr, diff: Expr) -> Runtime {
    let grammar = Grammar::new(vec![Rule::new("s", Expr::charset_diff(base, diff).unwrap()).into()])
        .unwrap();
    Runtime::build(&grammar, None, &BuildOptions::default(), None).unwrap()
}

#[test_case('a', 'z', 'm', 'm', &[('a', 'l'), ('n', 'z')]; "a-z minus m splits in two")]
#[test_case('a', 'z', 'f', 'm', &[('a', 'e'), ('n', 'z')]; "a-z minus f-m splits in two")]
fn range_minus_range_or_char(
    base_start: char,
    base_end: char,
    diff_start: char,
    diff_end: char,
    expected: &[(char, char)],
) {
    let base = Expr::charset(vec![CharsetGroup::range(base_start, base_end).unwrap()]).unwrap();
    let diff = if diff_start == diff_end {
        Expr::charset(vec![CharsetGroup::Char(diff_start)]).unwrap()
    } else {
        Expr::charset(vec![CharsetGroup::range(diff_start, diff_end).unwrap()]).unwrap()
    };
    let rt = build_diff(base, diff);
    let groups = single_charset(&rt, "s");
    let expected: Vec<CharsetGroup> = expected
        .iter()
        .map(|&(a, z)| {
            if a == z {
                CharsetGroup::Char(a)
            } else {
                CharsetGroup::range(a, z).unwrap()
            }
        })
        .collect();
    assert_eq!(groups, expected);
}

#[test]
fn f_through_m_minus_a_through_z_eliminates_the_rule_to_empty() {
    let base = Expr::charset(vec![CharsetGroup::range('f', 'm').unwrap()]).unwrap();
    let diff = Expr::charset(vec![CharsetGroup::range('a', 'z').unwrap()]).unwrap();
    let rt = build_diff(base, diff);
    assert!(matches!(rt.rule("s").unwrap().kind, polygrammar::ExprKind::Empty));
}

#[test]
fn disjoint_ranges_subtract_to_nothing_removed() {
    let base = Expr::charset(vec![CharsetGroup::range('a', 'c').unwrap()]).unwrap();
    let diff = Expr::charset(vec![CharsetGroup::range('x', 'z').unwrap()]).unwrap();
    let rt = build_diff(base, diff);
    assert_eq!(
        single_charset(&rt, "s"),
        vec![CharsetGroup::range('a', 'c').unwrap()]
    );
}
