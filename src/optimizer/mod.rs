//! The rule-map optimizer (§4.2): a pipeline of rule-map-wide rewrites run
//! once, in a fixed order, after the rule-map builder produces a raw map.
//!
//! Grounded on `original_source/polygrammar/optimizer.py`'s single
//! `optimize_expr` dispatch, split here into one pass per concern (as the
//! spec's component table separates them) so each rewrite is independently
//! testable, the way the teacher crate keeps `rhs_closure`, `cycles`, and
//! `usefulness` as separate fixpoint passes over one `BinarizedCfg` rather
//! than one monolithic function.

mod charset;
mod empty;
mod inline;
mod regexp;

use crate::rulemap::{MethodMap, RuleMap};

/// Runs the full optimizer pipeline over a freshly built rule map: inline,
/// string→charset, charset coalesce, charset diff, empty elimination, then
/// regexp conversion last (§4.2).
pub fn optimize(rule_map: RuleMap, method_map: &MethodMap) -> RuleMap {
    let rule_map = inline::inline(rule_map, method_map);
    let rule_map = charset::promote_strings(rule_map);
    let rule_map = charset::coalesce(rule_map);
    let rule_map = charset::subtract(rule_map);
    let rule_map = empty::eliminate(rule_map);
    regexp::convert(rule_map)
}
