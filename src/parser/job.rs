//! The nondeterministic recursive-descent engine itself (§4.3), ported from
//! `original_source/polygrammar/recursive_parser.py`'s `ParseJob`.
//!
//! The Python original yields states from a generator; Rust has no
//! built-in generators, so enumeration here is continuation-passing: every
//! `dispatch_*` method takes an `on_solution` callback and invokes it once
//! per successful state, short-circuiting via [`ControlFlow::Break`] when
//! the caller (`first_parse`) only wants the first one. Because the
//! callbacks recurse back into `&self`, the job's bookkeeping (furthest
//! offset, debug stacks, the symbolic call stack) lives behind `Cell`/
//! `RefCell` rather than being threaded as `&mut self` — the same shared,
//! interior-mutable-diagnostics shape `pczarn_cfg`'s `RhsClosure` uses for
//! its worklist while the rest of the traversal stays read-only.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ops::ControlFlow;

use regex::Regex;

use crate::ir::{Expr, ExprKind, RepeatMax};
use crate::parser::error::{CandidateFailure, ParseFailure};
use crate::rulemap::Runtime;
use crate::value::Value;

type OnSolution<'cb> = dyn FnMut(State) -> ControlFlow<()> + 'cb;

/// `(offset, accumulated results)`, the engine's notion of state (§4.3).
#[derive(Clone, Debug)]
pub struct State {
    pub offset: usize,
    pub results: Vec<Value>,
}

/// A single-use parse attempt over one input string (§5: "not safe to
/// share"; a job owns its own diagnostic counters and nothing else does).
pub struct ParseJob<'a> {
    runtime: &'a Runtime,
    text: &'a str,
    max_offset: Cell<usize>,
    debug_offset: Cell<Option<usize>>,
    debug_stacks: RefCell<Vec<CandidateFailure>>,
    call_stack: RefCell<Vec<(String, usize)>>,
    regex_cache: RefCell<HashMap<String, Regex>>,
}

impl<'a> ParseJob<'a> {
    pub fn new(runtime: &'a Runtime, text: &'a str) -> Self {
        ParseJob {
            runtime,
            text,
            max_offset: Cell::new(0),
            debug_offset: Cell::new(None),
            debug_stacks: RefCell::new(Vec::new()),
            call_stack: RefCell::new(Vec::new()),
            regex_cache: RefCell::new(HashMap::new()),
        }
    }

    /// The furthest offset reached so far by this job.
    pub fn max_offset(&self) -> usize {
        self.max_offset.get()
    }

    /// Enumerates every solution of `start` at `offset`, calling
    /// `on_solution` once per solution in `Alt`-order (§4.3, §5).
    pub fn run(
        &self,
        start: &str,
        offset: usize,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        self.dispatch_symbol(State { offset, results: Vec::new() }, start, false, false, on_solution)
    }

    /// Re-runs `start` at `offset` with debug collection armed at
    /// [`ParseJob::max_offset`], then returns the recorded candidate
    /// failures (§4.3 "Diagnostics").
    pub fn run_debug(&self, start: &str, offset: usize) -> Vec<CandidateFailure> {
        self.debug_offset.set(Some(self.max_offset.get()));
        self.debug_stacks.borrow_mut().clear();
        let _ = self.run(start, offset, &mut |_| ControlFlow::Continue(()));
        self.debug_stacks.borrow().clone()
    }

    fn record_failure(&self, offset: usize, reason: String) {
        if self.debug_offset.get() == Some(offset) {
            let context = self.call_stack.borrow().clone();
            self.debug_stacks
                .borrow_mut()
                .push(CandidateFailure { reason, context });
        }
    }

    fn dispatch(
        &self,
        state: State,
        expr: &'a Expr,
        ignore: bool,
        token: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        self.max_offset.set(self.max_offset.get().max(state.offset));
        let ignore = ignore || expr.meta().is_ignore();
        let token = token || expr.meta().is_token();
        match &expr.kind {
            ExprKind::Alt(exprs) => self.dispatch_alt(state, exprs, ignore, token, on_solution),
            ExprKind::Cat(exprs) => self.dispatch_cat(state, exprs, ignore, token, on_solution),
            ExprKind::String(value) => {
                self.dispatch_string(state, value, expr.meta().is_case_insensitive(), ignore, on_solution)
            }
            ExprKind::Symbol(name) => self.dispatch_symbol(state, name, ignore, token, on_solution),
            ExprKind::Repeat { expr: inner, min, max } => {
                self.dispatch_repeat(state, inner, *min, *max, ignore, token, on_solution)
            }
            ExprKind::Charset(groups) => self.dispatch_charset(state, groups, ignore, on_solution),
            ExprKind::Diff { base, diff } => self.dispatch_diff(state, base, diff, ignore, token, on_solution),
            ExprKind::Regexp(pattern) => self.dispatch_regexp(state, pattern, ignore, on_solution),
            ExprKind::Empty => on_solution(state),
            ExprKind::EndOfFile => self.dispatch_eof(state, on_solution),
        }
    }

    fn dispatch_symbol(
        &self,
        state: State,
        name: &str,
        ignore: bool,
        token: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        let runtime = self.runtime;
        let expr = runtime
            .rule(name)
            .unwrap_or_else(|| unreachable!("undefined symbol {name:?} should have been caught at build time"));

        if ignore || expr.meta().is_ignore() {
            return self.dispatch(state, expr, true, token, on_solution);
        }

        self.call_stack.borrow_mut().push((name.to_string(), state.offset));
        let outer_results = state.results;
        let is_token = token || expr.meta().is_token();
        let method_name = runtime.method_map().get(name).cloned();
        let inner_state = State { offset: state.offset, results: Vec::new() };

        let cf = self.dispatch(inner_state, expr, false, is_token, &mut |inner_done| {
            let end_offset = inner_done.offset;
            let collapsed = if is_token {
                let joined: String = inner_done.results.iter().map(Value::to_string).collect();
                match &method_name {
                    Some(m) => runtime.visitor().call(m, &[Value::Str(joined)]),
                    None => Value::Str(joined),
                }
            } else if let Some(m) = &method_name {
                runtime.visitor().call(m, &inner_done.results)
            } else {
                Value::Node(name.to_string(), inner_done.results)
            };

            let mut results = outer_results.clone();
            results.push(collapsed);
            on_solution(State { offset: end_offset, results })
        });
        self.call_stack.borrow_mut().pop();
        cf
    }

    fn dispatch_alt(
        &self,
        state: State,
        exprs: &'a [Expr],
        ignore: bool,
        token: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        for e in exprs {
            if let ControlFlow::Break(()) = self.dispatch(state.clone(), e, ignore, token, on_solution) {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn dispatch_cat(
        &self,
        state: State,
        exprs: &'a [Expr],
        ignore: bool,
        token: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        match exprs.split_first() {
            None => on_solution(state),
            Some((head, tail)) => self.dispatch(state, head, ignore, token, &mut |next_state| {
                self.dispatch_cat(next_state, tail, ignore, token, on_solution)
            }),
        }
    }

    fn dispatch_repeat(
        &self,
        state: State,
        inner: &'a Expr,
        min: u32,
        max: RepeatMax,
        ignore: bool,
        token: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        let can_continue = !matches!(max, RepeatMax::Bounded(0));
        if can_continue {
            let next_min = min.saturating_sub(1);
            let next_max = match max {
                RepeatMax::Unbounded => RepeatMax::Unbounded,
                RepeatMax::Bounded(m) => RepeatMax::Bounded(m - 1),
            };
            let cf = self.dispatch(state.clone(), inner, ignore, token, &mut |next_state| {
                self.dispatch_repeat(next_state, inner, next_min, next_max, ignore, token, on_solution)
            });
            if let ControlFlow::Break(()) = cf {
                return cf;
            }
        }
        if min == 0 {
            on_solution(state)
        } else {
            ControlFlow::Continue(())
        }
    }

    fn dispatch_diff(
        &self,
        state: State,
        base: &'a Expr,
        diff: &'a Expr,
        ignore: bool,
        token: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        self.dispatch(state.clone(), base, ignore, token, &mut |base_solution| {
            // Open Question 1 (SPEC_FULL.md §12): `diff` is matched at the
            // original offset, not at wherever `base` stopped.
            let mut diff_matched = false;
            let _ = self.dispatch(state.clone(), diff, ignore, token, &mut |_| {
                diff_matched = true;
                ControlFlow::Break(())
            });
            if diff_matched {
                self.record_failure(state.offset, format!("diff: excluded by {diff:?}"));
                ControlFlow::Continue(())
            } else {
                on_solution(base_solution)
            }
        })
    }

    fn dispatch_string(
        &self,
        state: State,
        value: &str,
        case_insensitive: bool,
        ignore: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        let end = state.offset + value.len();
        let slice = self.text.get(state.offset..end);
        let is_match = match slice {
            Some(s) if case_insensitive => s.to_lowercase() == value.to_lowercase(),
            Some(s) => s == value,
            None => false,
        };
        if !is_match {
            self.record_failure(
                state.offset,
                format!("string {value:?} did not match at offset {}", state.offset),
            );
            return ControlFlow::Continue(());
        }
        let mut results = state.results;
        if !ignore {
            results.push(Value::Str(slice.expect("is_match implies Some").to_string()));
        }
        on_solution(State { offset: end, results })
    }

    fn dispatch_charset(
        &self,
        state: State,
        groups: &[crate::ir::CharsetGroup],
        ignore: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        let Some(ch) = self.text[state.offset..].chars().next() else {
            self.record_failure(state.offset, "charset: end of input".to_string());
            return ControlFlow::Continue(());
        };
        if !groups.iter().any(|g| g.matches(ch)) {
            self.record_failure(state.offset, format!("charset: {ch:?} not in set"));
            return ControlFlow::Continue(());
        }
        let mut results = state.results;
        if !ignore {
            results.push(Value::Char(ch));
        }
        on_solution(State {
            offset: state.offset + ch.len_utf8(),
            results,
        })
    }

    fn dispatch_regexp(
        &self,
        state: State,
        pattern: &str,
        ignore: bool,
        on_solution: &mut OnSolution<'_>,
    ) -> ControlFlow<()> {
        let matched = {
            let mut cache = self.regex_cache.borrow_mut();
            let regex = cache.entry(pattern.to_string()).or_insert_with(|| {
                Regex::new(&format!("^(?:{pattern})"))
                    .expect("the optimizer only ever emits patterns it generated itself")
            });
            regex
                .find(&self.text[state.offset..])
                .map(|m| m.as_str().to_string())
        };
        match matched {
            Some(matched_text) => {
                let end = state.offset + matched_text.len();
                let mut results = state.results;
                if !ignore {
                    results.push(Value::Str(matched_text));
                }
                on_solution(State { offset: end, results })
            }
            None => {
                self.record_failure(state.offset, format!("regexp {pattern:?} did not match"));
                ControlFlow::Continue(())
            }
        }
    }

    fn dispatch_eof(&self, state: State, on_solution: &mut OnSolution<'_>) -> ControlFlow<()> {
        if state.offset == self.text.len() {
            on_solution(State {
                offset: state.offset + 1,
                results: state.results,
            })
        } else {
            self.record_failure(state.offset, "end of file: not at end of input".to_string());
            ControlFlow::Continue(())
        }
    }
}

/// Turns a job's recorded failures plus its furthest offset into a public
/// [`ParseFailure`] (§4.3 "Diagnostics").
pub(crate) fn failure_from_job(job: &ParseJob<'_>, text: &str, start: &str, offset: usize) -> ParseFailure {
    let candidates = job.run_debug(start, offset);
    ParseFailure::new(text, job.max_offset(), candidates)
}
