//! The grammar intermediate representation (§3): expressions, metadata,
//! rules/grammars, and generic tree transforms.

pub mod expr;
pub mod metadata;
pub mod rule;
pub mod transform;

pub use expr::{CharsetGroup, Expr, ExprKind, RepeatMax};
pub use metadata::{MetaValue, Metadata};
pub use rule::{Directive, Grammar, GrammarItem, Rule};
