//! The Lisp reader (§6): parses the `(kind args…)` s-expression surface into
//! IR [`Grammar`]/[`Expr`] values.
//!
//! Grounded in `original_source/polygrammar/grammars/lisp.py`'s
//! `LISP_GRAMMAR` (the token shapes: symbols, doubled-quote strings,
//! `;`-to-newline comments, `" \t\n\r,"` as whitespace) and `LispVisitor`
//! (the `lisp_name` kind dispatch). Unlike the Python original this reader
//! is hand-written rather than bootstrapped through the core engine itself
//! (see SPEC_FULL.md §11 for why).

use crate::ir::expr::CharsetGroup;
use crate::ir::rule::{Grammar, GrammarItem, Rule};
use crate::ir::{Expr, RepeatMax};
use crate::lisp::error::LispError;
use crate::lisp::escapes;

/// One parsed Lisp datum, before it is interpreted against a grammar/expr
/// context.
#[derive(Clone, Debug, PartialEq)]
enum Datum {
    Sym(String),
    Str(String),
    List(Vec<Datum>),
    /// `#name datum` or `#(name value) datum`: `tags` carries the
    /// annotations and `datum` is the thing they apply to (§6).
    Tagged(Vec<(String, Option<Box<Datum>>)>, Box<Datum>),
}

fn describe(d: &Datum) -> String {
    match d {
        Datum::Sym(s) => format!("symbol {s:?}"),
        Datum::Str(s) => format!("string {s:?}"),
        Datum::List(_) => "a list".to_string(),
        Datum::Tagged(_, inner) => describe(inner),
    }
}

struct Reader<'a> {
    text: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r', ','];

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Self {
        Reader {
            text,
            chars: text.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn pos(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(self.text.len())
    }

    fn bump(&mut self) -> Option<char> {
        self.chars.next().map(|(_, c)| c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if WHITESPACE.contains(&c) => {
                    self.bump();
                }
                Some(';') => {
                    while let Some(c) = self.peek() {
                        self.bump();
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn read_datum(&mut self) -> Result<Datum, LispError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(LispError::UnexpectedEof),
            Some('#') => self.read_tagged(),
            Some('(') => self.read_list(),
            Some('"') => self.read_string().map(Datum::Str),
            Some(')') => Err(LispError::UnexpectedChar(')', self.pos())),
            Some(_) => self.read_symbol().map(Datum::Sym),
        }
    }

    fn read_tagged(&mut self) -> Result<Datum, LispError> {
        let mut tags = Vec::new();
        while self.peek() == Some('#') {
            self.bump();
            self.skip_trivia();
            match self.peek() {
                Some('(') => {
                    let list = self.read_list()?;
                    let Datum::List(mut items) = list else {
                        unreachable!("read_list always returns Datum::List")
                    };
                    if items.len() != 2 {
                        return Err(LispError::WrongArity {
                            kind: "#(name value)".to_string(),
                            expected: "2".to_string(),
                            got: items.len(),
                        });
                    }
                    let value = items.pop().expect("len checked above");
                    let name = datum_name(&items.pop().expect("len checked above"))?;
                    tags.push((name, Some(Box::new(value))));
                }
                Some(_) => {
                    let name = self.read_symbol()?;
                    tags.push((name, None));
                }
                None => return Err(LispError::UnexpectedEof),
            }
            self.skip_trivia();
        }
        let inner = self.read_datum()?;
        Ok(Datum::Tagged(tags, Box::new(inner)))
    }

    fn read_list(&mut self) -> Result<Datum, LispError> {
        let open = self.pos();
        self.bump(); // consume '('
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(LispError::UnexpectedEof),
                Some(')') => {
                    self.bump();
                    return Ok(Datum::List(items));
                }
                _ => items.push(self.read_datum().map_err(|e| match e {
                    LispError::UnexpectedEof => LispError::UnterminatedString(open),
                    other => other,
                })?),
            }
        }
    }

    fn read_string(&mut self) -> Result<String, LispError> {
        let start = self.pos();
        self.bump(); // opening quote
        let mut body = String::new();
        loop {
            match self.bump() {
                None => return Err(LispError::UnterminatedString(start)),
                Some('"') => {
                    // Doubled quote: `""` inside the literal means a
                    // literal `"`; a lone `"` closes the literal.
                    if self.peek() == Some('"') {
                        body.push('"');
                        body.push('"');
                        self.bump();
                        continue;
                    }
                    return escapes::unescape(&body, start + 1);
                }
                Some('\\') => {
                    body.push('\\');
                    match self.bump() {
                        Some(c) => body.push(c),
                        None => return Err(LispError::UnterminatedString(start)),
                    }
                }
                Some(c) => body.push(c),
            }
        }
    }

    fn read_symbol(&mut self) -> Result<String, LispError> {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if WHITESPACE.contains(&c) || c == '(' || c == ')' || c == '"' || c == '#' || c == ';' {
                break;
            }
            s.push(c);
            self.bump();
        }
        if s.is_empty() {
            return Err(LispError::UnexpectedChar(
                self.peek().unwrap_or('\0'),
                self.pos(),
            ));
        }
        Ok(s)
    }
}

fn datum_name(d: &Datum) -> Result<String, LispError> {
    match d {
        Datum::Sym(s) | Datum::Str(s) => Ok(s.clone()),
        other => Err(LispError::ExpectedAtom(describe(other))),
    }
}

/// Parses `text` as a `(grammar (rule name expr)...)` form (§6).
pub fn parse_grammar(text: &str) -> Result<Grammar, LispError> {
    let mut reader = Reader::new(text);
    let datum = reader.read_datum()?;
    reader.skip_trivia();
    if reader.peek().is_some() {
        return Err(LispError::TrailingData);
    }
    interpret_grammar(&datum)
}

fn strip_tags<'a>(d: &'a Datum) -> (&'a Datum, Vec<(&'a str, Option<&'a Datum>)>) {
    match d {
        Datum::Tagged(tags, inner) => {
            let (base, mut outer) = strip_tags(inner);
            let mut mine: Vec<(&str, Option<&Datum>)> = tags
                .iter()
                .map(|(n, v)| (n.as_str(), v.as_deref()))
                .collect();
            mine.append(&mut outer);
            (base, mine)
        }
        other => (other, Vec::new()),
    }
}

fn interpret_grammar(d: &Datum) -> Result<Grammar, LispError> {
    let (base, _tags) = strip_tags(d);
    let Datum::List(items) = base else {
        return Err(LispError::NotAGrammar(describe(base)));
    };
    let Some((head, rest)) = items.split_first() else {
        return Err(LispError::NotAGrammar("an empty list".to_string()));
    };
    if datum_name(head)? != "grammar" {
        return Err(LispError::NotAGrammar(describe(head)));
    }
    let rules = rest
        .iter()
        .map(interpret_rule)
        .collect::<Result<Vec<GrammarItem>, LispError>>()?;
    Grammar::new(rules).map_err(LispError::from)
}

fn interpret_rule(d: &Datum) -> Result<GrammarItem, LispError> {
    let (base, tags) = strip_tags(d);
    let Datum::List(items) = base else {
        return Err(LispError::NotARule);
    };
    if items.len() != 3 {
        return Err(LispError::WrongArity {
            kind: "rule".to_string(),
            expected: "3".to_string(),
            got: items.len(),
        });
    }
    if datum_name(&items[0])? != "rule" {
        return Err(LispError::NotARule);
    }
    let name = datum_name(&items[1])?;
    let expr = interpret_expr(&items[2])?;

    let is_additional_alt = tags.iter().any(|(n, _)| *n == "additional_alt");
    let is_additional_cat = tags.iter().any(|(n, _)| *n == "additional_cat");
    Ok(GrammarItem::Rule(Rule {
        name,
        expr,
        is_additional_alt,
        is_additional_cat,
    }))
}

fn apply_tags(mut expr: Expr, tags: &[(&str, Option<&Datum>)]) -> Result<Expr, LispError> {
    for (name, value) in tags {
        match value {
            None => {
                expr.meta_mut().set_flag(*name);
            }
            Some(Datum::Str(s)) => {
                expr.meta_mut()
                    .set(*name, crate::ir::metadata::MetaValue::Text(s.clone()));
            }
            Some(Datum::Sym(s)) => {
                let value = match s.parse::<i64>() {
                    Ok(n) => crate::ir::metadata::MetaValue::Int(n),
                    Err(_) => crate::ir::metadata::MetaValue::Text(s.clone()),
                };
                expr.meta_mut().set(*name, value);
            }
            Some(other) => return Err(LispError::ExpectedAtom(describe(other))),
        }
    }
    Ok(expr)
}

fn interpret_expr(d: &Datum) -> Result<Expr, LispError> {
    let (base, tags) = strip_tags(d);
    let expr = interpret_expr_kind(base)?;
    apply_tags(expr, &tags)
}

fn interpret_expr_kind(d: &Datum) -> Result<Expr, LispError> {
    let Datum::List(items) = d else {
        return Err(LispError::ExpectedList(describe(d)));
    };
    let Some((head, args)) = items.split_first() else {
        return Err(LispError::ExpectedList("an empty list".to_string()));
    };
    let kind = resolve_alias(&datum_name(head)?);

    match kind.as_str() {
        "alt" => Ok(Expr::alt(interpret_exprs(args)?)),
        "cat" => Ok(Expr::cat(interpret_exprs(args)?)),
        "optional" => Ok(Expr::optional(one_expr(&kind, args)?)),
        "zero_or_more" => Ok(Expr::zero_or_more(one_expr(&kind, args)?)),
        "one_or_more" => Ok(Expr::one_or_more(one_expr(&kind, args)?)),
        "repeat" => {
            expect_arity(&kind, args, 3)?;
            let inner = interpret_expr(&args[0])?;
            let min = parse_u32(&args[1])?;
            let max = parse_repeat_max(&args[2])?;
            Ok(Expr::repeat(inner, min, max)?)
        }
        "symbol" => {
            expect_arity(&kind, args, 1)?;
            Ok(Expr::symbol(datum_name(&args[0])?)?)
        }
        "string" => {
            expect_arity(&kind, args, 1)?;
            let Datum::Str(s) = strip_tags(&args[0]).0 else {
                return Err(LispError::ExpectedAtom(describe(&args[0])));
            };
            Ok(Expr::string(s.clone())?)
        }
        "charset" => {
            let groups = args
                .iter()
                .map(interpret_charset_group)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::charset(groups)?)
        }
        "diff" => {
            expect_arity(&kind, args, 2)?;
            Ok(Expr::diff(interpret_expr(&args[0])?, interpret_expr(&args[1])?))
        }
        "charset_diff" => {
            expect_arity(&kind, args, 2)?;
            Ok(Expr::charset_diff(
                interpret_expr(&args[0])?,
                interpret_expr(&args[1])?,
            )?)
        }
        "regexp" => {
            expect_arity(&kind, args, 1)?;
            let Datum::Str(s) = strip_tags(&args[0]).0 else {
                return Err(LispError::ExpectedAtom(describe(&args[0])));
            };
            Ok(Expr::regexp(s.clone()))
        }
        "empty" => {
            expect_arity(&kind, args, 0)?;
            Ok(Expr::empty())
        }
        "end_of_file" => {
            expect_arity(&kind, args, 0)?;
            Ok(Expr::end_of_file())
        }
        other => Err(LispError::UnknownKind(other.to_string())),
    }
}

fn resolve_alias(kind: &str) -> String {
    match kind {
        "|" => "alt",
        "*" => "zero_or_more",
        "+" => "one_or_more",
        "?" => "optional",
        "-" => "diff",
        other => other,
    }
    .to_string()
}

fn interpret_exprs(args: &[Datum]) -> Result<Vec<Expr>, LispError> {
    args.iter().map(interpret_expr).collect()
}

fn one_expr(kind: &str, args: &[Datum]) -> Result<Expr, LispError> {
    expect_arity(kind, args, 1)?;
    interpret_expr(&args[0])
}

fn expect_arity(kind: &str, args: &[Datum], expected: usize) -> Result<(), LispError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(LispError::WrongArity {
            kind: kind.to_string(),
            expected: expected.to_string(),
            got: args.len(),
        })
    }
}

fn parse_u32(d: &Datum) -> Result<u32, LispError> {
    let name = datum_name(d)?;
    name.parse::<u32>()
        .map_err(|_| LispError::InvalidRepeatMax(name))
}

fn parse_repeat_max(d: &Datum) -> Result<RepeatMax, LispError> {
    let name = datum_name(d)?;
    match name.as_str() {
        "inf" | "unbounded" => Ok(RepeatMax::Unbounded),
        _ => name
            .parse::<u32>()
            .map(RepeatMax::Bounded)
            .map_err(|_| LispError::InvalidRepeatMax(name)),
    }
}

/// A charset member: `(char c)`, `(char_range a z)`, or a bare one-character
/// string literal (§6; `LISP_GRAMMAR_STR`'s `(charset """")` spells the
/// charset containing only `"` this way).
fn interpret_charset_group(d: &Datum) -> Result<CharsetGroup, LispError> {
    let (base, _tags) = strip_tags(d);
    match base {
        Datum::Str(s) => single_char(s),
        Datum::List(items) => {
            let Some((head, args)) = items.split_first() else {
                return Err(LispError::ExpectedList("an empty list".to_string()));
            };
            match datum_name(head)?.as_str() {
                "char" => {
                    expect_arity("char", args, 1)?;
                    let Datum::Str(s) = strip_tags(&args[0]).0 else {
                        return Err(LispError::ExpectedAtom(describe(&args[0])));
                    };
                    single_char(s)
                }
                "char_range" => {
                    expect_arity("char_range", args, 2)?;
                    let start = char_arg(&args[0])?;
                    let end = char_arg(&args[1])?;
                    Ok(CharsetGroup::range(start, end)?)
                }
                other => Err(LispError::UnknownKind(other.to_string())),
            }
        }
        other => Err(LispError::ExpectedAtom(describe(other))),
    }
}

fn char_arg(d: &Datum) -> Result<char, LispError> {
    let (base, _) = strip_tags(d);
    match base {
        Datum::Str(s) => single_char(s).map(|g| match g {
            CharsetGroup::Char(c) => c,
            CharsetGroup::Range(..) => unreachable!("single_char never returns a Range"),
        }),
        other => Err(LispError::ExpectedAtom(describe(other))),
    }
}

fn single_char(s: &str) -> Result<CharsetGroup, LispError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(CharsetGroup::Char(c)),
        _ => Err(LispError::InvalidCharLiteral(s.to_string())),
    }
}
