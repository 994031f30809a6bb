//! Empty elimination (§4.2 "Empty elimination").
//!
//! `Repeat`'s four specializations collapse to `Empty` whenever their body
//! is `Empty` (however many or few times nothing is repeated, the result is
//! still nothing); `Alt`/`Cat` drop `Empty` children outright, with an
//! `Alt` that loses one becoming `Optional` of the remainder so the
//! alternative of "match nothing" is preserved; `Diff` against `Empty`
//! passes `base` through unchanged, and `Diff` of `Empty` against anything
//! stays `Empty`.

use crate::ir::transform::tree_transform;
use crate::ir::{Expr, ExprKind};
use crate::rulemap::RuleMap;

pub fn eliminate(rule_map: RuleMap) -> RuleMap {
    rule_map
        .into_iter()
        .map(|(name, expr)| (name, tree_transform(expr, &mut eliminate_node)))
        .collect()
}

fn eliminate_node(e: Expr) -> Expr {
    let meta = e.meta().clone();
    match e.kind {
        ExprKind::Repeat {
            expr: inner,
            min,
            max,
        } => {
            if matches!(inner.kind, ExprKind::Empty) {
                Expr::empty().tagged_with(&meta)
            } else {
                Expr::with_meta(
                    ExprKind::Repeat {
                        expr: inner,
                        min,
                        max,
                    },
                    meta,
                )
            }
        }
        ExprKind::Diff { base, diff } => {
            if matches!(base.kind, ExprKind::Empty) {
                Expr::empty().tagged_with(&meta)
            } else if matches!(diff.kind, ExprKind::Empty) {
                (*base).tagged_with(&meta)
            } else {
                Expr::with_meta(ExprKind::Diff { base, diff }, meta)
            }
        }
        ExprKind::Alt(exprs) => {
            let had_empty = exprs.iter().any(|c| matches!(c.kind, ExprKind::Empty));
            let remainder: Vec<Expr> = exprs
                .into_iter()
                .filter(|c| !matches!(c.kind, ExprKind::Empty))
                .collect();
            if !had_empty {
                return Expr::alt(remainder).tagged_with(&meta);
            }
            if remainder.is_empty() {
                Expr::empty().tagged_with(&meta)
            } else {
                Expr::optional(Expr::alt(remainder)).tagged_with(&meta)
            }
        }
        ExprKind::Cat(exprs) => {
            let remainder: Vec<Expr> = exprs
                .into_iter()
                .filter(|c| !matches!(c.kind, ExprKind::Empty))
                .collect();
            if remainder.is_empty() {
                Expr::empty().tagged_with(&meta)
            } else {
                Expr::cat(remainder).tagged_with(&meta)
            }
        }
        other => Expr::with_meta(other, meta),
    }
}
