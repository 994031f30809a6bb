//! String→charset promotion, charset coalescing, and charset subtraction
//! (§4.2 "String-to-charset promotion" / "Charset coalescing").
//!
//! `subtract_groups` is a direct port of
//! `original_source/polygrammar/optimizer.py`'s `subtract_groups`, which
//! walks two sorted lists of half-open `(a, z)` ranges and splits/trims the
//! base list in place.

use crate::ir::expr::CharsetGroup;
use crate::ir::metadata::Metadata;
use crate::ir::transform::tree_transform;
use crate::ir::{Expr, ExprKind};
use crate::rulemap::RuleMap;

/// A single-character `String` becomes a `Charset`; case-insensitive
/// literals gain both letter cases (§4.2, §8).
pub fn promote_strings(rule_map: RuleMap) -> RuleMap {
    rewrite_all(rule_map, |e| {
        let meta = e.meta().clone();
        if let ExprKind::String(s) = &e.kind {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return Expr::charset_char(c, meta.is_case_insensitive()).tagged_with(&meta);
            }
        }
        e
    })
}

fn tags_match(a: &Metadata, b: &Metadata) -> bool {
    a.is_token() == b.is_token() && a.is_ignore() == b.is_ignore()
}

/// Merges adjacent `Charset` children of an `Alt` whose `token`/`ignore`
/// tag state matches, so later dispatch sees one match attempt instead of
/// several (§4.2).
pub fn coalesce(rule_map: RuleMap) -> RuleMap {
    rewrite_all(rule_map, |e| {
        let meta = e.meta().clone();
        match e.kind {
            ExprKind::Alt(exprs) => {
                let merged = merge_adjacent_charsets(exprs);
                Expr::alt(merged).tagged_with(&meta)
            }
            other => Expr::with_meta(other, meta),
        }
    })
}

fn merge_adjacent_charsets(exprs: Vec<Expr>) -> Vec<Expr> {
    let mut out: Vec<Expr> = Vec::with_capacity(exprs.len());
    for e in exprs {
        let merged = match (out.last(), &e.kind) {
            (Some(last), ExprKind::Charset(g2)) => match &last.kind {
                ExprKind::Charset(g1) if tags_match(last.meta(), e.meta()) => {
                    let mut groups = g1.clone();
                    groups.extend(g2.iter().copied());
                    Some(Expr::charset(groups).expect("non-empty: both operands were non-empty").tagged_with(last.meta()))
                }
                _ => None,
            },
            _ => None,
        };
        match merged {
            Some(m) => {
                out.pop();
                out.push(m);
            }
            None => out.push(e),
        }
    }
    out
}

/// Folds `Diff(Charset, Charset)` into a single `Charset` via interval
/// subtraction (§4.2, §8 "Charset algebra").
pub fn subtract(rule_map: RuleMap) -> RuleMap {
    rewrite_all(rule_map, |e| {
        let meta = e.meta().clone();
        if let ExprKind::Diff { base, diff } = &e.kind {
            if let (ExprKind::Charset(g1), ExprKind::Charset(g2)) = (&base.kind, &diff.kind) {
                let groups = subtract_groups(g1, g2);
                return match Expr::charset(groups) {
                    Ok(charset) => charset.tagged_with(&meta),
                    Err(_) => Expr::empty().tagged_with(&meta),
                };
            }
        }
        e
    })
}

/// Subtracts `diff`'s codepoints from `base`'s, returning the residual
/// groups as minimal `Char`/`Range` spans.
fn subtract_groups(base: &[CharsetGroup], diff: &[CharsetGroup]) -> Vec<CharsetGroup> {
    let mut base_ranges: Vec<(u32, u32)> = base.iter().map(|g| g.to_half_open()).collect();
    base_ranges.sort_unstable();
    let mut diff_ranges: Vec<(u32, u32)> = diff.iter().map(|g| g.to_half_open()).collect();
    diff_ranges.sort_unstable();

    let mut i = 0usize;
    let mut j = 0usize;
    while i < base_ranges.len() && j < diff_ranges.len() {
        let (a1, z1) = base_ranges[i];
        let (a2, z2) = diff_ranges[j];

        if z1 <= a2 {
            // No overlap, keep base range.
            i += 1;
        } else if z2 <= a1 {
            // No overlap, skip diff range.
            j += 1;
        } else if a1 < a2 && z1 <= z2 {
            // Overlap, keep left part of base range.
            base_ranges[i] = (a1, a2);
            i += 1;
        } else if a2 <= a1 && z2 < z1 {
            // Overlap, keep right part of base range.
            base_ranges[i] = (z2, z1);
            j += 1;
        } else if a1 < a2 && z2 < z1 {
            // Overlap, splitting base range in two.
            base_ranges.splice(i..i + 1, [(a1, a2), (z2, z1)]);
            i += 1;
        } else {
            // Overlap, remove base range.
            base_ranges.remove(i);
        }
    }

    base_ranges
        .into_iter()
        .map(|(a, z)| {
            let start = char::from_u32(a).expect("codepoint came from a valid char");
            if a + 1 == z {
                CharsetGroup::Char(start)
            } else {
                let end = char::from_u32(z - 1).expect("codepoint came from a valid char");
                CharsetGroup::range(start, end).expect("z - 1 > a, so start < end")
            }
        })
        .collect()
}

fn rewrite_all(rule_map: RuleMap, mut f: impl FnMut(Expr) -> Expr) -> RuleMap {
    rule_map
        .into_iter()
        .map(|(name, expr)| (name, tree_transform(expr, &mut f)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charset(chars: &str) -> Vec<CharsetGroup> {
        chars.chars().map(CharsetGroup::Char).collect()
    }

    #[test]
    fn a_through_z_minus_m_splits_into_two_ranges() {
        let base = vec![CharsetGroup::range('a', 'z').unwrap()];
        let diff = vec![CharsetGroup::Char('m')];
        let result = subtract_groups(&base, &diff);
        assert_eq!(
            result,
            vec![
                CharsetGroup::range('a', 'l').unwrap(),
                CharsetGroup::range('n', 'z').unwrap(),
            ]
        );
    }

    #[test]
    fn a_through_z_minus_f_through_m_splits_into_two_ranges() {
        let base = vec![CharsetGroup::range('a', 'z').unwrap()];
        let diff = vec![CharsetGroup::range('f', 'm').unwrap()];
        let result = subtract_groups(&base, &diff);
        assert_eq!(
            result,
            vec![
                CharsetGroup::range('a', 'e').unwrap(),
                CharsetGroup::range('n', 'z').unwrap(),
            ]
        );
    }

    #[test]
    fn f_through_m_minus_a_through_z_is_empty() {
        let base = vec![CharsetGroup::range('f', 'm').unwrap()];
        let diff = vec![CharsetGroup::range('a', 'z').unwrap()];
        assert!(subtract_groups(&base, &diff).is_empty());
    }

    #[test]
    fn promote_turns_single_char_string_into_charset() {
        let mut rule_map = RuleMap::new();
        rule_map.insert("s".to_string(), Expr::string("x").unwrap());
        let result = promote_strings(rule_map);
        assert!(matches!(result["s"].kind, ExprKind::Charset(ref g) if g == &charset("x")));
    }

    #[test]
    fn coalesce_merges_adjacent_charsets_with_matching_tags() {
        let mut rule_map = RuleMap::new();
        rule_map.insert(
            "s".to_string(),
            Expr::alt(vec![
                Expr::charset(charset("a")).unwrap(),
                Expr::charset(charset("b")).unwrap(),
            ]),
        );
        let result = coalesce(rule_map);
        match &result["s"].kind {
            ExprKind::Charset(groups) => assert_eq!(groups.len(), 2),
            other => panic!("expected a merged Charset, got {other:?}"),
        }
    }
}
