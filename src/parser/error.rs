//! Parse-time diagnostics (§7 error kind 2), ported from
//! `original_source/polygrammar/recursive_parser.py`'s `ParseError.__str__`.

use std::fmt;

/// One leaf match attempt (`String`/`Charset`/`Regexp`/`EndOfFile`) that
/// failed at the furthest offset reached during a failed `first_parse`
/// (§4.3 "Diagnostics").
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateFailure {
    /// What was attempted and why it didn't match.
    pub reason: String,
    /// The chain of `name@offset` rule-symbol frames active when the leaf
    /// was attempted, outermost first.
    pub context: Vec<(String, usize)>,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            let path = self
                .context
                .iter()
                .map(|(name, offset)| format!("{name}@{offset}"))
                .collect::<Vec<_>>()
                .join(" > ");
            write!(f, "{} ({path})", self.reason)
        }
    }
}

/// Raised by [`super::first_parse`] when no solution exists (§7 error kind 2).
///
/// Carries the input text, the furthest offset the engine reached, and
/// every leaf failure recorded at that offset, each with its own symbolic
/// context path — the aggregate of what every alternative tried and why it
/// gave up, rather than one arbitrary failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseFailure {
    text: String,
    offset: usize,
    candidates: Vec<CandidateFailure>,
}

impl ParseFailure {
    pub(crate) fn new(text: &str, offset: usize, candidates: Vec<CandidateFailure>) -> Self {
        ParseFailure {
            text: text.to_string(),
            offset,
            candidates,
        }
    }

    /// The furthest byte offset reached before parsing gave up.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Every leaf failure recorded at [`ParseFailure::offset`].
    pub fn candidates(&self) -> &[CandidateFailure] {
        &self.candidates
    }

    /// 1-based line and column of `self.offset`, computed by scanning for
    /// newlines the way the Python original's `__str__` does.
    fn line_and_column(&self) -> (usize, usize) {
        let mut line = 1;
        let mut line_start = 0;
        for (i, ch) in self.text.char_indices() {
            if i >= self.offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                line_start = i + ch.len_utf8();
            }
        }
        (line, self.offset - line_start)
    }

    fn offending_line(&self) -> &str {
        let line_start = self.text[..self.offset]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let line_end = self.text[self.offset..]
            .find('\n')
            .map(|i| self.offset + i)
            .unwrap_or(self.text.len());
        &self.text[line_start..line_end]
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.line_and_column();
        writeln!(f, "at {line}:{} (offset {}): no match", col + 1, self.offset)?;
        writeln!(f, "    {}", self.offending_line())?;
        writeln!(f, "    {}^", " ".repeat(col))?;
        for candidate in &self.candidates {
            writeln!(f, "  - {candidate}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseFailure {}
