//! Generic, metadata-preserving tree rewrites (system overview row 2:
//! "Generic post-order rewrite, child walk, symbol-set collection,
//! metadata-preserving wrappers").
//!
//! Mirrors `original_source/polygrammar/transforms.py`'s `tree_transform`,
//! `symbols`, and `preserve_metadata`, but expressed with owned `Expr`
//! rewriting instead of Python's generator-based `walk`.

use std::collections::HashSet;

use crate::ir::expr::{Expr, ExprKind};

/// Rewrites `expr` bottom-up: every child is transformed first, the node is
/// rebuilt with its (possibly changed) children while keeping its original
/// metadata, and only then is `f` applied to the rebuilt node.
///
/// This is the primitive every optimizer pass and rulemap transform is
/// built from (§4.2: "each transform either rewrites every expression
/// uniformly or re-keys the entire map").
pub fn tree_transform(expr: Expr, f: &mut impl FnMut(Expr) -> Expr) -> Expr {
    let meta = expr.meta().clone();
    let rebuilt = match expr.kind {
        ExprKind::Alt(exprs) => {
            let exprs = exprs.into_iter().map(|e| tree_transform(e, f)).collect();
            Expr::with_meta(ExprKind::Alt(exprs), meta)
        }
        ExprKind::Cat(exprs) => {
            let exprs = exprs.into_iter().map(|e| tree_transform(e, f)).collect();
            Expr::with_meta(ExprKind::Cat(exprs), meta)
        }
        ExprKind::Repeat { expr, min, max } => {
            let expr = Box::new(tree_transform(*expr, f));
            Expr::with_meta(ExprKind::Repeat { expr, min, max }, meta)
        }
        ExprKind::Diff { base, diff } => {
            let base = Box::new(tree_transform(*base, f));
            let diff = Box::new(tree_transform(*diff, f));
            Expr::with_meta(ExprKind::Diff { base, diff }, meta)
        }
        leaf => Expr::with_meta(leaf, meta),
    };
    f(rebuilt)
}

/// Visits every node of `expr` in post-order without rebuilding anything;
/// used for read-only analyses (e.g. "does this subtree contain a node
/// matching `pred`").
pub fn walk<'a>(expr: &'a Expr, f: &mut impl FnMut(&'a Expr)) {
    for child in expr.children() {
        walk(child, f);
    }
    f(expr);
}

/// Collects the set of rule names referenced anywhere inside `expr`
/// (`Symbol` leaves at any depth), used by the missing-symbol check (§4.1)
/// and by inlining's self-reference detection (§4.2).
pub fn symbols(expr: &Expr) -> HashSet<String> {
    let mut seen = HashSet::new();
    walk(expr, &mut |node| {
        if let ExprKind::Symbol(name) = &node.kind {
            seen.insert(name.clone());
        }
    });
    seen
}

/// Whether any node in `expr` (including `expr` itself) satisfies `pred`.
pub fn has_inner_node(expr: &Expr, mut pred: impl FnMut(&Expr) -> bool) -> bool {
    let mut found = false;
    walk(expr, &mut |node| {
        found = found || pred(node);
    });
    found
}
