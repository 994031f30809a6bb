//! Fixpoint inlining (§4.2 "Inlining").
//!
//! Ported from `original_source/polygrammar/optimizer.py`'s `optimize_expr`
//! `Symbol` arm: a `seen`/`visited` pair of name sets plays the role of the
//! Python closure's mutable locals, and the rule map itself is mutated
//! in place as each rule is inlined, so a rule visited twice is optimized
//! only once.

use std::collections::HashSet;

use crate::ir::{Expr, ExprKind};
use crate::rulemap::{MethodMap, RuleMap};

/// A rule is inlinable when it has no bound visitor method, or its body is
/// tagged `token`/`ignore` (those tags fix the arity of whatever emits into
/// the caller's results, so substituting the body in place is safe; §4.2).
fn inlinable_names(rule_map: &RuleMap, method_map: &MethodMap) -> HashSet<String> {
    rule_map
        .iter()
        .filter(|(name, expr)| {
            !method_map.contains_key(name.as_str()) || expr.meta().is_token() || expr.meta().is_ignore()
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Inlines every `Symbol` reference whose target is in `inlinable`,
/// to a fixpoint, leaving self-referential names as `Symbol` (§4.2).
pub fn inline(rule_map: RuleMap, method_map: &MethodMap) -> RuleMap {
    let inlinable = inlinable_names(&rule_map, method_map);
    let mut rule_map = rule_map;
    let mut seen = HashSet::new();
    let mut visited = HashSet::new();

    let names: Vec<String> = rule_map.keys().cloned().collect();
    let mut out = RuleMap::new();
    for name in names {
        let expr = optimize_expr(
            &mut rule_map,
            &mut seen,
            &mut visited,
            &inlinable,
            Expr::symbol(&name).expect("rule names are non-empty"),
        );
        out.insert(name, expr);
    }
    out
}

fn optimize_expr(
    rule_map: &mut RuleMap,
    seen: &mut HashSet<String>,
    visited: &mut HashSet<String>,
    inlinable: &HashSet<String>,
    expr: Expr,
) -> Expr {
    let meta = expr.meta().clone();
    match expr.kind {
        ExprKind::Symbol(name) => {
            if !inlinable.contains(&name) {
                return Expr::with_meta(ExprKind::Symbol(name), meta);
            }
            if seen.contains(&name) && !visited.contains(&name) {
                // On the inlining stack for `name`: a self-reference, leave it.
                return Expr::with_meta(ExprKind::Symbol(name), meta);
            }
            seen.insert(name.clone());
            if !visited.contains(&name) {
                let target = rule_map
                    .remove(&name)
                    .expect("symbol resolves to a rule-map entry (checked at build)");
                let optimized = optimize_expr(rule_map, seen, visited, inlinable, target);
                rule_map.insert(name.clone(), optimized);
            }
            visited.insert(name.clone());
            let resolved = rule_map
                .get(&name)
                .expect("just (re)inserted above")
                .clone();
            resolved.tagged_with(&meta)
        }
        ExprKind::Alt(exprs) => {
            let exprs = exprs
                .into_iter()
                .map(|e| optimize_expr(rule_map, seen, visited, inlinable, e))
                .collect();
            Expr::alt(exprs).tagged_with(&meta)
        }
        ExprKind::Cat(exprs) => {
            let exprs = exprs
                .into_iter()
                .map(|e| optimize_expr(rule_map, seen, visited, inlinable, e))
                .collect();
            Expr::cat(exprs).tagged_with(&meta)
        }
        ExprKind::Repeat {
            expr: inner,
            min,
            max,
        } => {
            let inner = optimize_expr(rule_map, seen, visited, inlinable, *inner);
            Expr::repeat(inner, min, max)
                .expect("bounds already validated when the rule was first built")
                .tagged_with(&meta)
        }
        ExprKind::Diff { base, diff } => {
            let base = optimize_expr(rule_map, seen, visited, inlinable, *base);
            let diff = optimize_expr(rule_map, seen, visited, inlinable, *diff);
            Expr::diff(base, diff).tagged_with(&meta)
        }
        other => Expr::with_meta(other, meta),
    }
}
