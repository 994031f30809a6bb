//! The Lisp writer (§6): turns IR [`Grammar`]/[`Expr`] values back into the
//! `(kind args…)` s-expression surface.
//!
//! Mirrors `original_source/polygrammar/grammars/escapes.py`'s `to_lisp` +
//! `lisp_str`, minus their column-width line-wrapping (this writer always
//! produces a single line; wrapping is a presentation concern the spec
//! doesn't require round-tripping).

use crate::ir::expr::CharsetGroup;
use crate::ir::metadata::MetaValue;
use crate::ir::rule::{Grammar, GrammarItem};
use crate::ir::{Expr, ExprKind, RepeatMax};
use crate::lisp::escapes;

/// Renders `grammar` as `(grammar (rule name expr) ...)` (§6).
pub fn write_grammar(grammar: &Grammar) -> String {
    let rules: Vec<String> = grammar.items().iter().map(write_item).collect();
    format!("(grammar {})", rules.join(" "))
}

fn write_item(item: &GrammarItem) -> String {
    match item {
        GrammarItem::Rule(rule) => {
            let body = format!(
                "(rule {} {})",
                rule.name,
                write_expr(&rule.expr)
            );
            let mut tags = String::new();
            if rule.is_additional_alt {
                tags.push_str("#additional_alt ");
            }
            if rule.is_additional_cat {
                tags.push_str("#additional_cat ");
            }
            format!("{tags}{body}")
        }
        GrammarItem::Directive(_) => {
            unreachable!("directives are expanded by the rule-map builder, never written back out")
        }
    }
}

/// Renders a single expression, with any metadata tags it carries prefixed
/// as `#name`/`#(name value)` annotations (§6).
pub fn write_expr(expr: &Expr) -> String {
    let tags = write_tags(expr);
    let body = write_expr_kind(expr);
    if tags.is_empty() {
        body
    } else {
        format!("{tags} {body}")
    }
}

fn write_tags(expr: &Expr) -> String {
    let mut parts: Vec<String> = expr
        .meta()
        .iter()
        .map(|(name, value)| match value {
            MetaValue::Flag => format!("#{name}"),
            MetaValue::Text(s) => format!("#({name} \"{}\")", escapes::escape(s)),
            MetaValue::Int(n) => format!("#({name} {n})"),
        })
        .collect();
    parts.sort();
    parts.join(" ")
}

fn write_expr_kind(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::String(s) => format!("(string \"{}\")", escapes::escape(s)),
        ExprKind::Symbol(name) => format!("(symbol {name})"),
        ExprKind::Charset(groups) => {
            let items: Vec<String> = groups.iter().map(write_charset_group).collect();
            format!("(charset {})", items.join(" "))
        }
        ExprKind::Alt(exprs) => format!("(alt {})", write_all(exprs)),
        ExprKind::Cat(exprs) => format!("(cat {})", write_all(exprs)),
        ExprKind::Repeat { expr: inner, min, max } => match (*min, *max) {
            (0, RepeatMax::Bounded(1)) => format!("(optional {})", write_expr(inner)),
            (0, RepeatMax::Unbounded) => format!("(zero_or_more {})", write_expr(inner)),
            (1, RepeatMax::Unbounded) => format!("(one_or_more {})", write_expr(inner)),
            (min, max) => format!("(repeat {} {min} {})", write_expr(inner), write_max(max)),
        },
        ExprKind::Diff { base, diff } => format!("(diff {} {})", write_expr(base), write_expr(diff)),
        ExprKind::Regexp(pattern) => format!("(regexp \"{}\")", escapes::escape(pattern)),
        ExprKind::Empty => "(empty)".to_string(),
        ExprKind::EndOfFile => "(end_of_file)".to_string(),
    }
}

fn write_all(exprs: &[Expr]) -> String {
    exprs.iter().map(write_expr).collect::<Vec<_>>().join(" ")
}

fn write_max(max: RepeatMax) -> String {
    match max {
        RepeatMax::Unbounded => "inf".to_string(),
        RepeatMax::Bounded(n) => n.to_string(),
    }
}

fn write_charset_group(group: &CharsetGroup) -> String {
    match *group {
        CharsetGroup::Char(c) => format!("(char \"{}\")", escapes::escape(&c.to_string())),
        CharsetGroup::Range(start, end) => format!(
            "(char_range \"{}\" \"{}\")",
            escapes::escape(&start.to_string()),
            escapes::escape(&end.to_string())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::rule::Rule;

    #[test]
    fn writes_a_minimal_grammar() {
        let g = Grammar::new(vec![
            Rule::new("s", Expr::string("A").unwrap()).into(),
        ])
        .unwrap();
        assert_eq!(write_grammar(&g), r#"(grammar (rule s (string "A")))"#);
    }

    #[test]
    fn round_trips_through_the_reader() {
        let g = Grammar::new(vec![
            Rule::new(
                "s",
                Expr::alt(vec![Expr::string("a").unwrap(), Expr::string("b").unwrap()]),
            )
            .into(),
        ])
        .unwrap();
        let text = write_grammar(&g);
        let reparsed = crate::lisp::read::parse_grammar(&text).unwrap();
        let GrammarItem::Rule(original) = &g.items()[0] else { unreachable!() };
        let GrammarItem::Rule(round_tripped) = &reparsed.items()[0] else { unreachable!() };
        assert_eq!(original.expr, round_tripped.expr);
    }

    #[test]
    fn optional_zero_or_more_one_or_more_use_their_short_forms() {
        assert_eq!(
            write_expr(&Expr::optional(Expr::string("a").unwrap())),
            r#"(optional (string "a"))"#
        );
        assert_eq!(
            write_expr(&Expr::zero_or_more(Expr::string("a").unwrap())),
            r#"(zero_or_more (string "a"))"#
        );
        assert_eq!(
            write_expr(&Expr::one_or_more(Expr::string("a").unwrap())),
            r#"(one_or_more (string "a"))"#
        );
    }
}
