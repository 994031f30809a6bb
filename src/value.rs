//! Parse results (§4.3: "Results are assembled bottom-up into a tree of
//! `(name, args…)` tuples, or transformed through visitor callbacks").

use std::fmt;

/// A single accumulated parse result.
///
/// `Char`/`Str` are produced by matching `Charset`/`String`/`Regexp` nodes;
/// `Node` is the generic `(name, *args)` tuple the engine builds for a rule
/// with no bound visitor method (§4.3 dispatch for `Symbol`); a visitor
/// method may replace that tuple with any `Value` it likes, including a
/// `Node` under a different name.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A single matched character.
    Char(char),
    /// A matched or visitor-produced string (also the shape of a `token`
    /// rule's single collapsed result).
    Str(String),
    /// A generic rule result: the rule's name and its accumulated args.
    Node(String, Vec<Value>),
}

impl Value {
    /// Borrows the string payload of a `Str` value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrows the `(name, args)` payload of a `Node` value, if this is one.
    pub fn as_node(&self) -> Option<(&str, &[Value])> {
        match self {
            Value::Node(name, args) => Some((name.as_str(), args.as_slice())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Node(name, args) => {
                write!(f, "({name}")?;
                for a in args {
                    write!(f, " {a}")?;
                }
                write!(f, ")")
            }
        }
    }
}
