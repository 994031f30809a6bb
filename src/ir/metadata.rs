//! The metadata side-channel carried alongside every [`Expr`](super::expr::Expr).
//!
//! Per spec §3, metadata is an unordered `name → value` mapping attached to a
//! node and excluded from structural equality (§9, "Structural equality with
//! identity-independent metadata"). A handful of keys are recognized by the
//! core (`ignore`, `token`, `i`, `s`); everything else is preserved but left
//! uninterpreted, so the value type stays deliberately small rather than an
//! open-ended JSON-like tree.

use std::collections::HashMap;

/// Recognized metadata key: matches of the tagged node contribute no result
/// values.
pub const IGNORE: &str = "ignore";
/// Recognized metadata key: matches of the tagged node concatenate their
/// character results into a single string.
pub const TOKEN: &str = "token";
/// Recognized metadata key: case-insensitive literal matching.
pub const CASE_INSENSITIVE: &str = "i";
/// Recognized metadata key: case-sensitive literal matching.
pub const CASE_SENSITIVE: &str = "s";

/// The value half of a metadata entry. A bare tag (`#ignore`) stores
/// [`MetaValue::Flag`]; a tag with a payload (`#(name value)`) stores
/// [`MetaValue::Text`] or [`MetaValue::Int`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum MetaValue {
    /// A bare tag, equivalent to a boolean `true`.
    Flag,
    /// A tag carrying a string payload.
    Text(String),
    /// A tag carrying an integer payload.
    Int(i64),
}

impl MetaValue {
    /// Treats the value as a boolean flag: present and not explicitly
    /// textual/zero means "on".
    pub fn is_truthy(&self) -> bool {
        match self {
            MetaValue::Flag => true,
            MetaValue::Text(s) => !s.is_empty(),
            MetaValue::Int(n) => *n != 0,
        }
    }
}

/// Unordered `name → value` annotations attached to an [`Expr`](super::expr::Expr).
///
/// Equality and hashing on the owning `Expr` never look at `Metadata`;
/// rewrites must re-apply it explicitly (see [`Metadata::union`]).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    entries: HashMap<String, MetaValue>,
}

impl Metadata {
    /// An empty metadata map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a bare flag, e.g. `ignore` or `token`.
    pub fn set_flag(&mut self, key: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), MetaValue::Flag);
        self
    }

    /// Sets a key to an explicit value.
    pub fn set(&mut self, key: impl Into<String>, value: MetaValue) -> &mut Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Returns whether `key` is present and truthy.
    pub fn has(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(MetaValue::is_truthy)
    }

    /// Looks up a key's raw value.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Whether this node is tagged `ignore`.
    pub fn is_ignore(&self) -> bool {
        self.has(IGNORE)
    }

    /// Whether this node is tagged `token`.
    pub fn is_token(&self) -> bool {
        self.has(TOKEN)
    }

    /// Whether this node's `String` match is case-insensitive (tagged `i`
    /// and not tagged `s`; `s` wins if both are present, matching the
    /// surface grammars where `%s"…"` forces case-sensitivity).
    pub fn is_case_insensitive(&self) -> bool {
        self.has(CASE_INSENSITIVE) && !self.has(CASE_SENSITIVE)
    }

    /// Unions `other` onto `self`, with `other`'s entries taking precedence
    /// on key collisions. Used by rewrites that must re-apply a source
    /// node's metadata onto its replacement (§4.2, "All transforms are
    /// metadata-preserving").
    pub fn union(&self, other: &Metadata) -> Metadata {
        let mut merged = self.clone();
        for (k, v) in &other.entries {
            merged.entries.insert(k.clone(), v.clone());
        }
        merged
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether no tags at all are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
