//! The nondeterministic recursive-descent parser (§4.3, §6 `parse`/`first_parse`).

pub mod error;
mod job;

use std::ops::ControlFlow;

pub use error::{CandidateFailure, ParseFailure};
pub use job::{ParseJob, State};

use crate::rulemap::Runtime;
use crate::value::Value;

/// One successful parse: the entry rule's collapsed result and the
/// end-offset reached (§6 `parse`).
pub type Solution = (Vec<Value>, usize);

/// Enumerates every parse of `text` against `runtime` starting at `start`
/// (defaulting to the entry rule) and `offset` (defaulting to 0), in
/// `Alt`-order (§4.3, §6 `parse`).
///
/// This realizes the spec's "lazy sequence of states" contract as an eager
/// `Vec` — ordering is exactly as specified; only the enumeration mechanism
/// (generator vs. up-front collection) differs (§9 "Generators of
/// solutions").
pub fn parse(runtime: &Runtime, text: &str, start: Option<&str>, offset: usize) -> Vec<Solution> {
    let start = start.unwrap_or_else(|| runtime.entry());
    let job = ParseJob::new(runtime, text);
    let mut solutions = Vec::new();
    let _ = job.run(start, offset, &mut |state| {
        solutions.push((state.results, state.offset));
        ControlFlow::Continue(())
    });
    solutions
}

/// Returns the first parse of `text` against `runtime`, or a [`ParseFailure`]
/// carrying every leaf failure recorded at the furthest offset reached
/// (§4.3 "Diagnostics", §6 `first_parse`).
pub fn first_parse(
    runtime: &Runtime,
    text: &str,
    start: Option<&str>,
    offset: usize,
) -> Result<Solution, ParseFailure> {
    let start = start.unwrap_or_else(|| runtime.entry());
    let job = ParseJob::new(runtime, text);
    let mut found = None;
    let _ = job.run(start, offset, &mut |state| {
        found = Some((state.results, state.offset));
        ControlFlow::Break(())
    });

    match found {
        Some(solution) => Ok(solution),
        None => Err(job::failure_from_job(&job, text, start, offset)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::rule::{Grammar, GrammarItem, Rule};
    use crate::ir::Expr;
    use crate::rulemap::BuildOptions;

    fn build(items: Vec<GrammarItem>) -> Runtime {
        let grammar = Grammar::new(items).unwrap();
        Runtime::build(&grammar, None, &BuildOptions::default(), None).unwrap()
    }

    #[test]
    fn literal_match_yields_a_generic_tuple() {
        let rt = build(vec![Rule::new("s", Expr::string("A").unwrap()).into()]);
        let (results, offset) = first_parse(&rt, "A", None, 0).unwrap();
        assert_eq!(offset, 1);
        assert_eq!(results.len(), 1);
        match &results[0] {
            Value::Node(name, args) => {
                assert_eq!(name, "s");
                assert_eq!(args, &vec![Value::Str("A".to_string())]);
            }
            other => panic!("expected a Node, got {other:?}"),
        }
    }

    #[test]
    fn literal_mismatch_is_a_parse_failure() {
        let rt = build(vec![Rule::new("s", Expr::string("A").unwrap()).into()]);
        let err = first_parse(&rt, "B", None, 0).unwrap_err();
        assert_eq!(err.offset(), 0);
        assert!(!err.candidates().is_empty());
    }

    #[test]
    fn ambiguous_grammar_enumerates_every_parse_in_alt_order() {
        // s = ("A" s) | ("AA" s) | ("A" EOF);
        let s = Expr::alt(vec![
            Expr::cat(vec![Expr::string("A").unwrap(), Expr::symbol("s").unwrap()]),
            Expr::cat(vec![Expr::string("AA").unwrap(), Expr::symbol("s").unwrap()]),
            Expr::cat(vec![Expr::string("A").unwrap(), Expr::end_of_file()]),
        ]);
        let rt = build(vec![Rule::new("s", s).into()]);
        let solutions = parse(&rt, "AAAAA", None, 0);
        assert_eq!(solutions.len(), 5);
    }

    #[test]
    fn ignored_separator_contributes_no_result() {
        // INT = (digit | _sep)+; digit = [0-9]; _sep = [ _];
        let digit = Expr::charset(vec![crate::ir::CharsetGroup::range('0', '9').unwrap()]).unwrap();
        let sep = Expr::charset(vec![
            crate::ir::CharsetGroup::Char(' '),
            crate::ir::CharsetGroup::Char('_'),
        ])
        .unwrap();
        let int_rule = Expr::one_or_more(Expr::alt(vec![
            Expr::symbol("digit").unwrap(),
            Expr::symbol("_sep").unwrap(),
        ]));
        let rt = build(vec![
            Rule::new("INT", int_rule).into(),
            Rule::new("digit", digit).into(),
            Rule::new("_sep", sep).into(),
        ]);
        let (results, offset) = first_parse(&rt, "1 234_567", None, 0).unwrap();
        assert_eq!(offset, 9);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0], Value::Str("1234567".to_string()));
    }
}
