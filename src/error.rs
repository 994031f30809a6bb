//! Grammar construction errors (§7.1).
//!
//! Parse-time failures are a different shape (they carry input text, an
//! offset, and candidate sub-failures) and live in
//! [`crate::parser::error::ParseFailure`] instead.

use thiserror::Error;

/// Everything that can go wrong while building an `Expr`/`Rule`/`Grammar` or
/// turning a `Grammar` into a `Runtime` (§7.1).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("String literal must be non-empty")]
    EmptyLiteral,

    #[error("Symbol name must be non-empty")]
    EmptySymbolName,

    #[error("Charset must contain at least one group")]
    EmptyCharset,

    #[error("invalid char range: {start:?}..={end:?} (start must be < end; use Char for a single character)")]
    InvalidCharRange { start: char, end: char },

    #[error("Repeat min ({min}) is greater than max ({max})")]
    RepeatBoundsInverted { min: u32, max: u32 },

    #[error("CharsetDiff base must be Charset, Symbol or CharsetDiff, and diff must be Charset or Symbol")]
    CharsetDiffTypeMismatch,

    #[error("a grammar must contain at least one rule")]
    EmptyGrammar,

    #[error("a grammar's entry item must be a rule, not a directive")]
    EntryIsDirective,

    #[error("duplicate rule(s): {0}")]
    DuplicateRule(String),

    #[error("undefined rule(s): {0}")]
    UndefinedSymbol(String),

    #[error("unused visitor method(s): {0}")]
    UnusedVisitorMethods(String),

    #[error("import directive requires a grammar catalog, but none was provided")]
    NoCatalog,

    #[error("catalog has no grammar named {0:?}")]
    UnknownCatalogGrammar(String),

    #[error("grammar {grammar:?} has no rule named {symbol:?} to import")]
    UnknownImportedRule { grammar: String, symbol: String },
}
