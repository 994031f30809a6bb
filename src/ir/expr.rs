//! The grammar expression tree (§3).
//!
//! `Expr` is a value-typed tagged union with a metadata side-channel. It
//! plays the role the teacher crate gives to [`Rule`](crate::ir::rule::Rule)
//! and `Symbol`: an algebraic type that every other component (tree
//! transforms, the rule-map builder, the optimizer, the parser) matches on
//! exhaustively rather than dispatching through trait objects, mirroring
//! `pczarn_cfg`'s closed `BinarizedRuleRhs`/`GrammarRule` style.

use std::fmt;

use crate::error::BuildError;
use crate::ir::metadata::Metadata;

/// A single character or an inclusive character range, the only two things
/// that may appear inside a [`ExprKind::Charset`]. Spec §3 describes these as
/// their own `Expr` variants used only inside `Charset`; they carry no
/// metadata of their own; giving them a dedicated, `Copy` value type (rather
/// than boxing them as full `Expr` nodes) keeps charset algebra (§4.2,
/// §8 "Charset algebra") allocation-free.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum CharsetGroup {
    /// A single character.
    Char(char),
    /// An inclusive range `start..=end`, `start < end`.
    Range(char, char),
}

impl CharsetGroup {
    /// Builds a range, rejecting `start >= end` (invariant #2; use
    /// [`CharsetGroup::Char`] for a single character).
    pub fn range(start: char, end: char) -> Result<Self, BuildError> {
        if start < end {
            Ok(CharsetGroup::Range(start, end))
        } else {
            Err(BuildError::InvalidCharRange { start, end })
        }
    }

    /// Whether `ch` is covered by this group.
    pub fn matches(&self, ch: char) -> bool {
        match *self {
            CharsetGroup::Char(c) => c == ch,
            CharsetGroup::Range(start, end) => start <= ch && ch <= end,
        }
    }

    /// The group's first and one-past-last codepoints, as a half-open
    /// range, for interval arithmetic (§4.2 charset coalescing/subtraction).
    pub fn to_half_open(self) -> (u32, u32) {
        match self {
            CharsetGroup::Char(c) => (c as u32, c as u32 + 1),
            CharsetGroup::Range(start, end) => (start as u32, end as u32 + 1),
        }
    }
}

/// The upper bound of a [`ExprKind::Repeat`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum RepeatMax {
    /// Bounded by a concrete count.
    Bounded(u32),
    /// Unbounded (`∞`).
    Unbounded,
}

/// The tagged union of grammar expressions (§3).
///
/// Matches the parser's dispatch table in §4.3 one-for-one: every variant
/// here is exactly one arm of `ParseJob::parse_expr`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// Literal text match; non-empty.
    String(String),
    /// Reference to another rule by name; non-empty.
    Symbol(String),
    /// A set of characters; non-empty.
    Charset(Vec<CharsetGroup>),
    /// Ordered alternation; flattened, `len() >= 2` (invariant #3).
    Alt(Vec<Expr>),
    /// Ordered concatenation; flattened, `len() >= 2` (invariant #3).
    Cat(Vec<Expr>),
    /// Bounded repetition; `min <= max` when bounded (invariant #4).
    /// `Optional`/`ZeroOrMore`/`OneOrMore` are just canonical `(min, max)`
    /// pairs over this one representation, as in the Python original where
    /// they subclass `Repeat`.
    Repeat {
        expr: Box<Expr>,
        min: u32,
        max: RepeatMax,
    },
    /// Accepts what `base` accepts that `diff` does not accept. The
    /// `CharsetDiff` narrowing (base/diff restricted to
    /// `Charset`/`Symbol`/`CharsetDiff`) is a validated *construction path*
    /// ([`Expr::charset_diff`]), not a separate variant.
    Diff { base: Box<Expr>, diff: Box<Expr> },
    /// A compiled regular expression; introduced only by the optimizer's
    /// regexp-conversion pass, never written by hand in source grammars.
    Regexp(String),
    /// Matches the empty string; introduced only by optimization.
    Empty,
    /// Matches only at end of input.
    EndOfFile,
}

/// A grammar expression plus its metadata side-channel.
///
/// Equality and hashing compare `kind` only; `meta` is excluded, per §9
/// ("Structural equality with identity-independent metadata").
#[derive(Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    meta: Metadata,
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.meta.is_empty() {
            write!(f, "{:?}", self.kind)
        } else {
            f.debug_struct("Expr")
                .field("kind", &self.kind)
                .field("meta", &self.meta)
                .finish()
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Expr {}

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Expr {
            kind,
            meta: Metadata::new(),
        }
    }

    /// Wraps `kind` with `meta` attached, for use by rewrites that must
    /// re-inherit a source node's metadata (§4.2, metadata-preserving).
    pub fn with_meta(kind: ExprKind, meta: Metadata) -> Self {
        Expr { kind, meta }
    }

    /// This node's metadata.
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    /// Mutable access to this node's metadata, for builders applying the
    /// naming-convention tags (§4.1).
    pub fn meta_mut(&mut self) -> &mut Metadata {
        &mut self.meta
    }

    /// Returns a copy of this node re-tagged with `meta` unioned on top of
    /// its existing metadata.
    pub fn tagged_with(&self, meta: &Metadata) -> Self {
        Expr {
            kind: self.kind.clone(),
            meta: self.meta.union(meta),
        }
    }

    /// A non-empty literal match.
    pub fn string(value: impl Into<String>) -> Result<Self, BuildError> {
        let value = value.into();
        if value.is_empty() {
            return Err(BuildError::EmptyLiteral);
        }
        Ok(Self::new(ExprKind::String(value)))
    }

    /// A reference to another rule.
    pub fn symbol(name: impl Into<String>) -> Result<Self, BuildError> {
        let name = name.into();
        if name.is_empty() {
            return Err(BuildError::EmptySymbolName);
        }
        Ok(Self::new(ExprKind::Symbol(name)))
    }

    /// A set of characters.
    pub fn charset(groups: Vec<CharsetGroup>) -> Result<Self, BuildError> {
        if groups.is_empty() {
            return Err(BuildError::EmptyCharset);
        }
        Ok(Self::new(ExprKind::Charset(groups)))
    }

    /// A single-character charset, the canonical target of string→charset
    /// promotion (§4.2); `case_insensitive` adds both letter cases when they
    /// differ (§8, "Case-insensitive single-character strings...").
    pub fn charset_char(ch: char, case_insensitive: bool) -> Self {
        let groups = if case_insensitive {
            let (lo, up) = (
                ch.to_lowercase().next().unwrap_or(ch),
                ch.to_uppercase().next().unwrap_or(ch),
            );
            if lo == up {
                vec![CharsetGroup::Char(ch)]
            } else {
                vec![CharsetGroup::Char(lo), CharsetGroup::Char(up)]
            }
        } else {
            vec![CharsetGroup::Char(ch)]
        };
        Self::new(ExprKind::Charset(groups))
    }

    /// Ordered alternation. Flattens nested `Alt`s and collapses a singleton
    /// result to its sole child (invariant #3). Panics if `exprs` is empty;
    /// callers only ever invoke this with grammar-author-supplied operands,
    /// never with attacker-controlled arity.
    pub fn alt(exprs: Vec<Expr>) -> Self {
        let flat = flatten(exprs, |e| matches!(e.kind, ExprKind::Alt(_)));
        collapse_or_wrap(flat, ExprKind::Alt)
    }

    /// Ordered concatenation. Flattens nested `Cat`s and collapses a
    /// singleton result to its sole child (invariant #3).
    pub fn cat(exprs: Vec<Expr>) -> Self {
        let flat = flatten(exprs, |e| matches!(e.kind, ExprKind::Cat(_)));
        collapse_or_wrap(flat, ExprKind::Cat)
    }

    /// A bounded repetition; rejects `min > max` (invariant #4).
    pub fn repeat(expr: Expr, min: u32, max: RepeatMax) -> Result<Self, BuildError> {
        if let RepeatMax::Bounded(max) = max {
            if min > max {
                return Err(BuildError::RepeatBoundsInverted { min, max });
            }
        }
        Ok(Self::new(ExprKind::Repeat {
            expr: Box::new(expr),
            min,
            max,
        }))
    }

    /// `Repeat(expr, 0, 1)`.
    pub fn optional(expr: Expr) -> Self {
        Self::new(ExprKind::Repeat {
            expr: Box::new(expr),
            min: 0,
            max: RepeatMax::Bounded(1),
        })
    }

    /// `Repeat(expr, 0, ∞)`.
    pub fn zero_or_more(expr: Expr) -> Self {
        Self::new(ExprKind::Repeat {
            expr: Box::new(expr),
            min: 0,
            max: RepeatMax::Unbounded,
        })
    }

    /// `Repeat(expr, 1, ∞)`.
    pub fn one_or_more(expr: Expr) -> Self {
        Self::new(ExprKind::Repeat {
            expr: Box::new(expr),
            min: 1,
            max: RepeatMax::Unbounded,
        })
    }

    /// General set difference: accepts what `base` accepts that `diff`
    /// does not, at the same starting offset (§4.3, Open Question 1).
    pub fn diff(base: Expr, diff: Expr) -> Self {
        Self::new(ExprKind::Diff {
            base: Box::new(base),
            diff: Box::new(diff),
        })
    }

    /// The narrowed `CharsetDiff` form used to express charset subtraction:
    /// `base` must be `Charset`, `Symbol`, or itself a `CharsetDiff`; `diff`
    /// must be `Charset` or `Symbol` (§3).
    pub fn charset_diff(base: Expr, diff: Expr) -> Result<Self, BuildError> {
        let base_ok = matches!(base.kind, ExprKind::Charset(_) | ExprKind::Symbol(_))
            || is_charset_diff(&base);
        let diff_ok = matches!(diff.kind, ExprKind::Charset(_) | ExprKind::Symbol(_));
        if !base_ok || !diff_ok {
            return Err(BuildError::CharsetDiffTypeMismatch);
        }
        Ok(Self::diff(base, diff))
    }

    /// A compiled regular expression (optimizer output only).
    pub fn regexp(pattern: impl Into<String>) -> Self {
        Self::new(ExprKind::Regexp(pattern.into()))
    }

    /// Matches the empty string.
    pub fn empty() -> Self {
        Self::new(ExprKind::Empty)
    }

    /// Matches only at end of input.
    pub fn end_of_file() -> Self {
        Self::new(ExprKind::EndOfFile)
    }

    /// Direct children of this node, for generic tree walks (transform.rs).
    /// Leaf kinds (`String`, `Symbol`, `Charset`, `Regexp`, `Empty`,
    /// `EndOfFile`) have none.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Alt(exprs) | ExprKind::Cat(exprs) => exprs.iter().collect(),
            ExprKind::Repeat { expr, .. } => vec![expr.as_ref()],
            ExprKind::Diff { base, diff } => vec![base.as_ref(), diff.as_ref()],
            ExprKind::String(_)
            | ExprKind::Symbol(_)
            | ExprKind::Charset(_)
            | ExprKind::Regexp(_)
            | ExprKind::Empty
            | ExprKind::EndOfFile => vec![],
        }
    }
}

fn is_charset_diff(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Diff { base, diff } => {
            let base_ok =
                matches!(base.kind, ExprKind::Charset(_) | ExprKind::Symbol(_)) || is_charset_diff(base);
            let diff_ok = matches!(diff.kind, ExprKind::Charset(_) | ExprKind::Symbol(_));
            base_ok && diff_ok
        }
        _ => false,
    }
}

fn flatten(exprs: Vec<Expr>, is_same_kind: impl Fn(&Expr) -> bool) -> Vec<Expr> {
    let mut out = Vec::with_capacity(exprs.len());
    for e in exprs {
        if is_same_kind(&e) {
            out.extend(e.children_owned());
        } else {
            out.push(e);
        }
    }
    out
}

impl Expr {
    /// Consumes an `Alt`/`Cat` node, returning its owned children. Panics
    /// on any other variant; only used internally by [`flatten`].
    fn children_owned(self) -> Vec<Expr> {
        match self.kind {
            ExprKind::Alt(exprs) | ExprKind::Cat(exprs) => exprs,
            _ => unreachable!("children_owned called on a non-Alt/Cat node"),
        }
    }
}

fn collapse_or_wrap(mut exprs: Vec<Expr>, wrap: impl FnOnce(Vec<Expr>) -> ExprKind) -> Expr {
    match exprs.len() {
        0 => panic!("Alt/Cat requires at least one expression"),
        1 => exprs.pop().unwrap(),
        _ => Expr::new(wrap(exprs)),
    }
}
