//! User-supplied visitor hooks (§4.1 "Visitor binding", §4.3 generic
//! dispatch for `Symbol`).
//!
//! The Python original matches visitor methods by introspecting a
//! `Visitor` instance's attributes at build time (`inspect.getmembers`).
//! Rust has no runtime reflection, so a `Visitor` here declares its own
//! method table up front via [`Visitor::method_names`]; the rule-map
//! builder still performs the same `visit_<name-with-hyphens-to-underscores>`
//! matching and unused-method accounting against that declared table.

use crate::value::Value;

/// A bundle of named callbacks a grammar's rules can be bound to.
///
/// A rule named `foo-bar` binds to a declared method named
/// `"visit_foo_bar"`. When a rule is `token`-tagged the callback receives a
/// single-element slice holding the concatenated string
/// (`[Value::Str(joined)]`); otherwise it receives the rule's accumulated
/// results as-is.
pub trait Visitor {
    /// The full method names this visitor provides, e.g.
    /// `["visit_term", "visit_SYMBOL"]`. Any name here not matched to a
    /// rule is reported as an unused visitor method (§4.1, §7.1).
    fn method_names(&self) -> &[&'static str];

    /// Invokes `method_name` (one of [`Visitor::method_names`]) with `args`.
    fn call(&self, method_name: &str, args: &[Value]) -> Value;
}

/// A `Visitor` with no declared methods: every rule falls back to the
/// engine's generic `(name, *args)` tuple (§4.3).
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVisitor;

impl Visitor for NoVisitor {
    fn method_names(&self) -> &[&'static str] {
        &[]
    }

    fn call(&self, method_name: &str, _args: &[Value]) -> Value {
        unreachable!("NoVisitor declares no methods, so {method_name:?} can never be called")
    }
}

/// Converts a rule name to the visitor method name that binds to it:
/// `visit_` followed by the name with `-` replaced by `_` (§4.1).
pub fn method_name_for_rule(rule_name: &str) -> String {
    format!("visit_{}", rule_name.replace('-', "_"))
}
