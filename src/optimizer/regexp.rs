//! Regexp conversion (§4.2 "Regexp conversion"), the last optimizer pass.
//!
//! A rule's whole body is folded into one [`ExprKind::Regexp`] when it is
//! tagged `token` or `ignore` and its subtree contains no `Symbol`, no
//! `Diff`, and no `ignore`-tagged inner node — those three conditions mean
//! the subtree's entire contribution to the result is "a run of
//! characters", which a compiled `regex::Regex` reproduces in one shot at
//! parse time without walking the tree node by node.

use crate::ir::transform::has_inner_node;
use crate::ir::{CharsetGroup, Expr, ExprKind, RepeatMax};
use crate::rulemap::RuleMap;

/// Replaces every rule's body that's eligible (§4.2) with a single
/// `Regexp(pattern)` node, in whatever iteration order `rule_map` yields —
/// rules are converted independently of one another.
pub fn convert(rule_map: RuleMap) -> RuleMap {
    rule_map
        .into_iter()
        .map(|(name, expr)| {
            if is_eligible(&expr) {
                let pattern = to_pattern(&expr);
                let meta = expr.meta().clone();
                (name, Expr::regexp(pattern).tagged_with(&meta))
            } else {
                (name, expr)
            }
        })
        .collect()
}

fn is_eligible(expr: &Expr) -> bool {
    if !(expr.meta().is_token() || expr.meta().is_ignore()) {
        return false;
    }
    !has_inner_node(expr, |n| {
        matches!(n.kind, ExprKind::Symbol(_) | ExprKind::Diff { .. }) || n.meta().is_ignore() && !std::ptr::eq(n, expr)
    })
}

/// Precedence, loosest-binding first, per §4.2: `Alt > Diff > Cat >
/// Repeat*`. A child is parenthesized into a non-capturing group whenever
/// its own precedence is looser than (or equal to, for `Diff`, which this
/// IR never nests on the regexp-eligible path) the parent's.
fn precedence(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Alt(_) => 0,
        ExprKind::Diff { .. } => 1,
        ExprKind::Cat(_) => 2,
        ExprKind::Repeat { .. } => 3,
        _ => 4,
    }
}

fn to_pattern(expr: &Expr) -> String {
    render(expr, 0)
}

fn render(expr: &Expr, parent_precedence: u8) -> String {
    let body = match &expr.kind {
        ExprKind::String(s) => {
            let escaped = escape_literal(s);
            if expr.meta().is_case_insensitive() {
                format!("(?i:{escaped})")
            } else {
                escaped
            }
        }
        ExprKind::Charset(groups) => render_charset(groups),
        ExprKind::Alt(exprs) => exprs
            .iter()
            .map(|e| render(e, precedence(expr)))
            .collect::<Vec<_>>()
            .join("|"),
        ExprKind::Cat(exprs) => exprs
            .iter()
            .map(|e| render(e, precedence(expr)))
            .collect::<Vec<_>>()
            .join(""),
        ExprKind::Repeat { expr: inner, min, max } => {
            let inner_pattern = render(inner, precedence(expr));
            format!("{inner_pattern}{}", repeat_suffix(*min, *max))
        }
        ExprKind::Regexp(pattern) => pattern.clone(),
        ExprKind::Empty => String::new(),
        ExprKind::EndOfFile => r"\z".to_string(),
        ExprKind::Symbol(_) | ExprKind::Diff { .. } => {
            unreachable!("is_eligible excludes Symbol and Diff from the regexp-conversion path")
        }
    };

    if precedence(expr) <= parent_precedence && needs_group(expr) {
        format!("(?:{body})")
    } else {
        body
    }
}

fn needs_group(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Alt(_) | ExprKind::Cat(_) | ExprKind::Diff { .. }
    )
}

fn repeat_suffix(min: u32, max: RepeatMax) -> String {
    match (min, max) {
        (0, RepeatMax::Bounded(1)) => "?".to_string(),
        (0, RepeatMax::Unbounded) => "*".to_string(),
        (1, RepeatMax::Unbounded) => "+".to_string(),
        (min, RepeatMax::Unbounded) => format!("{{{min},}}"),
        (min, RepeatMax::Bounded(max)) if min == max => format!("{{{min}}}"),
        (min, RepeatMax::Bounded(max)) => format!("{{{min},{max}}}"),
    }
}

fn render_charset(groups: &[CharsetGroup]) -> String {
    let mut body = String::from("[");
    for group in groups {
        match *group {
            CharsetGroup::Char(c) => body.push_str(&escape_in_class(c)),
            CharsetGroup::Range(start, end) => {
                body.push_str(&escape_in_class(start));
                body.push('-');
                body.push_str(&escape_in_class(end));
            }
        }
    }
    body.push(']');
    body
}

fn escape_in_class(c: char) -> String {
    if matches!(c, '-' | ']' | '^' | '\\') {
        format!("\\{c}")
    } else {
        c.to_string()
    }
}

fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(
            c,
            '.' | '^' | '$' | '|' | '(' | ')' | '[' | ']' | '{' | '}' | '*' | '+' | '?' | '\\'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::metadata::IGNORE;

    #[test]
    fn a_token_rule_with_no_symbols_becomes_a_regexp() {
        let mut rule_map = RuleMap::new();
        let digit = Expr::charset(vec![CharsetGroup::range('0', '9').unwrap()]).unwrap();
        let mut int_rule = Expr::one_or_more(digit);
        int_rule.meta_mut().set_flag("token");
        rule_map.insert("INT".to_string(), int_rule);

        let result = convert(rule_map);
        match &result["INT"].kind {
            ExprKind::Regexp(pattern) => assert_eq!(pattern, "[0-9]+"),
            other => panic!("expected Regexp, got {other:?}"),
        }
    }

    #[test]
    fn a_rule_referencing_a_symbol_is_left_alone() {
        let mut rule_map = RuleMap::new();
        let mut expr = Expr::symbol("other").unwrap();
        expr.meta_mut().set_flag("token");
        rule_map.insert("s".to_string(), expr);

        let result = convert(rule_map);
        assert!(matches!(result["s"].kind, ExprKind::Symbol(_)));
    }

    #[test]
    fn untagged_rule_is_left_alone() {
        let mut rule_map = RuleMap::new();
        rule_map.insert("s".to_string(), Expr::string("ab").unwrap());
        let result = convert(rule_map);
        assert!(matches!(result["s"].kind, ExprKind::String(_)));
    }

    #[test]
    fn alt_under_repeat_is_parenthesized() {
        let body = Expr::alt(vec![Expr::string("a").unwrap(), Expr::string("b").unwrap()]);
        let mut repeated = Expr::zero_or_more(body);
        repeated.meta_mut().set_flag(IGNORE);
        let mut rule_map = RuleMap::new();
        rule_map.insert("_s".to_string(), repeated);
        let result = convert(rule_map);
        match &result["_s"].kind {
            ExprKind::Regexp(pattern) => assert_eq!(pattern, "(?:a|b)*"),
            other => panic!("expected Regexp, got {other:?}"),
        }
    }
}
