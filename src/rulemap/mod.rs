//! The rule-map builder (§4.1): flattens a [`Grammar`](crate::ir::Grammar)
//! into an executable [`RuleMap`]/[`MethodMap`] pair, wired through naming
//! conventions and an optional [`Visitor`].

mod options;

pub use options::{BuildOptions, DuplicatePolicy, UnusedVisitorPolicy};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{info, warn};

use crate::error::BuildError;
use crate::ir::rule::{Directive, Grammar, GrammarItem, Rule};
use crate::ir::transform::symbols;
use crate::ir::Expr;
use crate::visitor::{method_name_for_rule, NoVisitor, Visitor};

/// Rule name to expression, the executable form of a [`Grammar`] (§3).
pub type RuleMap = HashMap<String, Expr>;

/// Rule name to the visitor method name bound to it (§3).
pub type MethodMap = HashMap<String, String>;

/// Other grammars available to `import` directives (§4.1, §6).
///
/// Absent (`None`) means no catalog was supplied; any `import` directive
/// then fails with [`BuildError::NoCatalog`] (Open Question 3, SPEC_FULL.md
/// §12).
pub type Catalog<'a> = HashMap<String, &'a Grammar>;

/// The immutable, executable result of building a [`Grammar`] (§3, §6
/// `build`).
#[derive(Debug)]
pub struct Runtime {
    rule_map: RuleMap,
    method_map: MethodMap,
    visitor: Arc<dyn Visitor>,
    entry: String,
}

impl Runtime {
    /// Builds a `Runtime` from `grammar`, applying duplicate-rule expansion,
    /// naming-convention tagging, visitor binding, the missing-symbol check,
    /// and finally the optimizer pipeline (§4.1, §6 `build`).
    pub fn build(
        grammar: &Grammar,
        visitor: Option<Arc<dyn Visitor>>,
        options: &BuildOptions,
        catalog: Option<&Catalog>,
    ) -> Result<Runtime, BuildError> {
        let entry = grammar.entry_name()?.to_string();
        let visitor = visitor.unwrap_or_else(|| Arc::new(NoVisitor));

        let mut rule_map = build_rule_map(grammar, options.on_duplicate_rule, catalog)?;
        let method_map = build_method_map(
            rule_map.keys(),
            visitor.as_ref(),
            options.on_unused_visitor_methods,
        )?;

        apply_naming_conventions(&mut rule_map);
        let rule_map = crate::optimizer::optimize(rule_map, &method_map);

        info!(
            "built runtime: {} rule(s), {} visitor method(s) bound",
            rule_map.len(),
            method_map.len()
        );

        Ok(Runtime {
            rule_map,
            method_map,
            visitor,
            entry,
        })
    }

    /// The executable rule map (post-optimization).
    pub fn rule_map(&self) -> &RuleMap {
        &self.rule_map
    }

    /// Rule name to bound visitor method name.
    pub fn method_map(&self) -> &MethodMap {
        &self.method_map
    }

    /// The bound visitor, used to dispatch `Symbol` results (§4.3).
    pub fn visitor(&self) -> &dyn Visitor {
        self.visitor.as_ref()
    }

    /// The grammar's entry rule name (the first rule in source order).
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Looks up a rule's expression by name.
    pub fn rule(&self, name: &str) -> Option<&Expr> {
        self.rule_map.get(name)
    }
}

fn run_directive(
    directive: &Directive,
    catalog: Option<&Catalog>,
) -> Result<Rule, BuildError> {
    match directive {
        Directive::Import {
            grammar,
            symbol,
            alias,
        } => {
            let catalog = catalog.ok_or(BuildError::NoCatalog)?;
            let other_grammar = catalog
                .get(grammar.as_str())
                .ok_or_else(|| BuildError::UnknownCatalogGrammar(grammar.clone()))?;
            let other_rt = Runtime::build(
                other_grammar,
                None,
                &BuildOptions::default(),
                Some(catalog),
            )?;
            let expr = other_rt
                .rule_map
                .get(symbol.as_str())
                .ok_or_else(|| BuildError::UnknownImportedRule {
                    grammar: grammar.clone(),
                    symbol: symbol.clone(),
                })?
                .clone();
            let name = alias.clone().unwrap_or_else(|| symbol.clone());
            Ok(Rule::new(name, expr))
        }
        Directive::Ignore { symbol } => Ok(Rule::additional_alt(
            "_ignored_tokens".to_string(),
            Expr::symbol(symbol).map_err(|_| BuildError::EmptySymbolName)?,
        )),
    }
}

/// Builds the raw `name -> Expr` map (before naming conventions and
/// optimization), expanding directives and applying the duplicate-rule
/// policy (§4.1), then runs the missing-symbol check (§3 invariant 1).
fn build_rule_map(
    grammar: &Grammar,
    on_duplicate_rule: DuplicatePolicy,
    catalog: Option<&Catalog>,
) -> Result<RuleMap, BuildError> {
    let mut rule_map: RuleMap = HashMap::new();
    let mut duplicate_rules = Vec::new();

    for item in grammar.items() {
        let rule = match item {
            GrammarItem::Rule(rule) => rule.clone(),
            GrammarItem::Directive(directive) => run_directive(directive, catalog)?,
        };

        let name = rule.name.clone();
        let expr = rule.expr;

        if !rule_map.contains_key(&name) || on_duplicate_rule == DuplicatePolicy::Overrides {
            rule_map.insert(name, expr);
            continue;
        }
        if rule.is_additional_alt || on_duplicate_rule == DuplicatePolicy::Overloads {
            let prev = rule_map.remove(&name).expect("just checked contains_key");
            rule_map.insert(name, Expr::alt(vec![prev, expr]));
            continue;
        }
        if rule.is_additional_cat {
            let prev = rule_map.remove(&name).expect("just checked contains_key");
            rule_map.insert(name, Expr::cat(vec![prev, expr]));
            continue;
        }
        duplicate_rules.push(name);
    }

    if !duplicate_rules.is_empty() {
        handle_problem(
            &format!("duplicate rule(s): {}", duplicate_rules.join(", ")),
            on_duplicate_rule.as_base(),
            || BuildError::DuplicateRule(duplicate_rules.join(", ")),
        )?;
    }

    let mut seen = HashSet::new();
    for expr in rule_map.values() {
        seen.extend(symbols(expr));
    }
    let defined: HashSet<&str> = rule_map.keys().map(String::as_str).collect();
    let mut missing: Vec<&str> = seen
        .iter()
        .map(String::as_str)
        .filter(|s| !defined.contains(s))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(BuildError::UndefinedSymbol(missing.join(", ")));
    }

    Ok(rule_map)
}

/// Binds visitor methods to rule names via the `visit_<name>` convention
/// and reports methods that bound to nothing (§4.1).
fn build_method_map<'a>(
    rule_names: impl Iterator<Item = &'a String>,
    visitor: &dyn Visitor,
    on_unused_visitor_methods: UnusedVisitorPolicy,
) -> Result<MethodMap, BuildError> {
    let mut available: HashSet<&str> = visitor.method_names().iter().copied().collect();
    let mut method_map = MethodMap::new();

    for name in rule_names {
        let method_name = method_name_for_rule(name);
        if available.remove(method_name.as_str()) {
            method_map.insert(name.clone(), method_name);
        }
    }

    if !available.is_empty() {
        let mut unused: Vec<&str> = available.into_iter().collect();
        unused.sort_unstable();
        handle_problem(
            &format!("unused visitor method(s): {}", unused.join(", ")),
            on_unused_visitor_methods,
            || BuildError::UnusedVisitorMethods(unused.join(", ")),
        )?;
    }

    Ok(method_map)
}

/// Applies the two naming conventions (§4.1): a leading `_` tags the rule's
/// body `ignore`; a leading uppercase letter tags it `token`.
fn apply_naming_conventions(rule_map: &mut RuleMap) {
    for (name, expr) in rule_map.iter_mut() {
        if name.starts_with('_') {
            expr.meta_mut().set_flag(crate::ir::metadata::IGNORE);
        } else if name.chars().next().is_some_and(char::is_uppercase) {
            expr.meta_mut().set_flag(crate::ir::metadata::TOKEN);
        }
    }
}

fn handle_problem(
    msg: &str,
    policy: UnusedVisitorPolicy,
    to_error: impl FnOnce() -> BuildError,
) -> Result<(), BuildError> {
    match policy {
        UnusedVisitorPolicy::Warn => {
            warn!("{msg}");
            Ok(())
        }
        UnusedVisitorPolicy::Error => Err(to_error()),
        UnusedVisitorPolicy::Ignore => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::rule::Rule;

    fn grammar_of(rules: Vec<Rule>) -> Grammar {
        Grammar::new(rules.into_iter().map(GrammarItem::Rule).collect()).unwrap()
    }

    #[test]
    fn missing_symbol_is_rejected() {
        let g = grammar_of(vec![Rule::new(
            "s".to_string(),
            Expr::symbol("nope").unwrap(),
        )]);
        let err = Runtime::build(&g, None, &BuildOptions::default(), None).unwrap_err();
        assert!(matches!(err, BuildError::UndefinedSymbol(_)));
    }

    #[test]
    fn leading_underscore_tags_ignore() {
        let g = grammar_of(vec![
            Rule::new("s".to_string(), Expr::symbol("_skip").unwrap()),
            Rule::new("_skip".to_string(), Expr::string("x").unwrap()),
        ]);
        let rt = Runtime::build(&g, None, &BuildOptions::default(), None).unwrap();
        assert!(rt.rule("_skip").unwrap().meta().is_ignore());
    }

    #[test]
    fn leading_uppercase_tags_token() {
        let g = grammar_of(vec![
            Rule::new("s".to_string(), Expr::symbol("INT").unwrap()),
            Rule::new("INT".to_string(), Expr::string("1").unwrap()),
        ]);
        let rt = Runtime::build(&g, None, &BuildOptions::default(), None).unwrap();
        assert!(rt.rule("INT").unwrap().meta().is_token());
    }

    #[test]
    fn overloads_policy_turns_duplicate_into_alt() {
        let g = grammar_of(vec![
            Rule::new("s".to_string(), Expr::string("a").unwrap()),
            Rule::new("s".to_string(), Expr::string("b").unwrap()),
        ]);
        let mut options = BuildOptions::default();
        options.on_duplicate_rule = DuplicatePolicy::Overloads;
        let rt = Runtime::build(&g, None, &options, None).unwrap();
        assert!(matches!(rt.rule("s").unwrap().kind, crate::ir::ExprKind::Alt(_)));
    }

    #[test]
    fn duplicate_rule_errors_by_default() {
        let g = grammar_of(vec![
            Rule::new("s".to_string(), Expr::string("a").unwrap()),
            Rule::new("s".to_string(), Expr::string("b").unwrap()),
        ]);
        let err = Runtime::build(&g, None, &BuildOptions::default(), None).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateRule(_)));
    }
}
