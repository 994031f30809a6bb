//! Errors raised while reading or writing the Lisp IR surface (§6).

use thiserror::Error;

use crate::error::BuildError;

/// Everything that can go wrong turning Lisp source text into a
/// [`Grammar`](crate::ir::Grammar), or an IR node into Lisp source text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LispError {
    #[error("unexpected end of input while reading a Lisp datum")]
    UnexpectedEof,

    #[error("unexpected character {0:?} at byte offset {1}")]
    UnexpectedChar(char, usize),

    #[error("unterminated string literal starting at byte offset {0}")]
    UnterminatedString(usize),

    #[error("invalid escape sequence {0:?} at byte offset {1}")]
    InvalidEscape(String, usize),

    #[error("expected a list, found {0}")]
    ExpectedList(String),

    #[error("expected a symbol or string, found {0}")]
    ExpectedAtom(String),

    #[error("unknown Lisp form kind {0:?}")]
    UnknownKind(String),

    #[error("form {kind:?} expects {expected} argument(s), got {got}")]
    WrongArity {
        kind: String,
        expected: String,
        got: usize,
    },

    #[error("top-level form must be (grammar ...), found {0:?}")]
    NotAGrammar(String),

    #[error("a grammar's rule entries must be (rule name expr) forms")]
    NotARule,

    #[error("invalid repeat bound {0:?}: expected a non-negative integer or `inf`/`unbounded`")]
    InvalidRepeatMax(String),

    #[error("invalid char literal {0:?}: expected exactly one character")]
    InvalidCharLiteral(String),

    #[error("trailing data after the top-level form")]
    TrailingData,

    #[error(transparent)]
    Build(#[from] BuildError),
}
