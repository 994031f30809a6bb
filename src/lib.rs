//! `polygrammar`: a polyglot grammar toolkit.
//!
//! A language-neutral intermediate representation for context-free grammars
//! ([`ir`]), a builder that flattens a grammar into an executable rule-map
//! and wires visitor methods ([`rulemap`]), an optimizer that rewrites the
//! rule-map (inlining, string→charset promotion, charset coalescing and
//! subtraction, regexp conversion — [`optimizer`]), and a nondeterministic
//! recursive-descent engine that enumerates every parse of an input against
//! that rule-map ([`parser`]). [`lisp`] is the one surface syntax this crate
//! loads directly, rather than leaving to an external collaborator (see
//! SPEC_FULL.md §11).

#![deny(
    missing_docs,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![cfg_attr(test, deny(warnings))]

pub mod error;
pub mod ir;
pub mod lisp;
pub mod optimizer;
pub mod parser;
pub mod rulemap;
pub mod value;
pub mod visitor;

pub use error::BuildError;
pub use ir::{CharsetGroup, Expr, ExprKind, Grammar, Metadata, RepeatMax, Rule};
pub use parser::{first_parse, parse, ParseFailure, Solution};
pub use rulemap::{BuildOptions, MethodMap, Runtime, RuleMap};
pub use value::Value;
pub use visitor::Visitor;
