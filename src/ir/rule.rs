//! Named expressions and grammars (§3).

use crate::error::BuildError;
use crate::ir::expr::Expr;

/// A named expression, the unit a [`Grammar`] is built from.
///
/// The two boolean flags only matter to the rule-map builder's duplicate
/// handling (§4.1): `is_additional_alt` folds a repeated name into an `Alt`
/// of the previous and new bodies; `is_additional_cat` folds it into a
/// `Cat`. A plain (non-directive) rule leaves both `false`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub name: String,
    pub expr: Expr,
    pub is_additional_alt: bool,
    pub is_additional_cat: bool,
}

impl Rule {
    /// A plain rule.
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Rule {
            name: name.into(),
            expr,
            is_additional_alt: false,
            is_additional_cat: false,
        }
    }

    /// A rule whose body is ABNF's `=/` alternative of an existing rule of
    /// the same name.
    pub fn additional_alt(name: impl Into<String>, expr: Expr) -> Self {
        Rule {
            name: name.into(),
            expr,
            is_additional_alt: true,
            is_additional_cat: false,
        }
    }

    /// A rule whose body concatenates onto an existing rule of the same
    /// name.
    pub fn additional_cat(name: impl Into<String>, expr: Expr) -> Self {
        Rule {
            name: name.into(),
            expr,
            is_additional_alt: false,
            is_additional_cat: true,
        }
    }
}

/// A directive in a grammar's rule stream, expanded by the rule-map builder
/// before map insertion (§4.1). These are not themselves rules: they carry
/// no expression until the builder resolves them against a catalog or
/// rewrites them into a synthetic rule.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Directive {
    /// `import G S [as A]` — borrow grammar `G`'s optimized rule `S` as the
    /// local rule `A` (or `S` if no alias is given).
    Import {
        grammar: String,
        symbol: String,
        alias: Option<String>,
    },
    /// `ignore S` — append `S` to the synthetic rule `_ignored_tokens`.
    Ignore { symbol: String },
}

/// One entry in a grammar's rule stream: either a rule or a directive to be
/// expanded into one (§4.1).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum GrammarItem {
    Rule(Rule),
    Directive(Directive),
}

impl From<Rule> for GrammarItem {
    fn from(rule: Rule) -> Self {
        GrammarItem::Rule(rule)
    }
}

impl From<Directive> for GrammarItem {
    fn from(directive: Directive) -> Self {
        GrammarItem::Directive(directive)
    }
}

/// A non-empty, ordered sequence of rules (and directives); the entry rule
/// is `rules[0]` (invariant #5).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Grammar {
    items: Vec<GrammarItem>,
}

impl Grammar {
    /// Builds a grammar from its rule stream. Fails if `items` is empty.
    pub fn new(items: Vec<GrammarItem>) -> Result<Self, BuildError> {
        if items.is_empty() {
            return Err(BuildError::EmptyGrammar);
        }
        Ok(Grammar { items })
    }

    /// The grammar's rule stream, in source order.
    pub fn items(&self) -> &[GrammarItem] {
        &self.items
    }

    /// The name of the entry rule — the first item, which must be a plain
    /// rule (a grammar cannot start with a directive).
    pub fn entry_name(&self) -> Result<&str, BuildError> {
        match self.items.first() {
            Some(GrammarItem::Rule(rule)) => Ok(rule.name.as_str()),
            Some(GrammarItem::Directive(_)) => Err(BuildError::EntryIsDirective),
            None => unreachable!("Grammar::new rejects empty item lists"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::Expr;

    #[test]
    fn empty_grammar_is_rejected() {
        assert!(matches!(Grammar::new(vec![]), Err(BuildError::EmptyGrammar)));
    }

    #[test]
    fn entry_name_is_first_rule() {
        let g = Grammar::new(vec![
            Rule::new("a", Expr::string("x").unwrap()).into(),
            Rule::new("b", Expr::string("y").unwrap()).into(),
        ])
        .unwrap();
        assert_eq!(g.entry_name().unwrap(), "a");
    }
}
