//! String-literal escape handling for the Lisp surface (§6 "String literals
//! use double quotes with doubled-quote and `\`-prefixed escapes").
//!
//! Ported from `original_source/polygrammar/grammars/escapes.py`'s
//! `SINGLE_CHAR_SLASH_ESCAPE` table plus the doubled-quote rule it unions in
//! for string bodies specifically.

use crate::lisp::error::LispError;

/// Unescapes the body of a double-quoted Lisp string literal (the text
/// between, but not including, the delimiting `"` characters).
///
/// Recognizes `""` (a literal `"`), the named slash escapes `\n \t \r \f \v
/// \a \b \\`, and the Unicode escapes `\xHH`, `\uHHHH`, `\UHHHHHHHH`.
pub fn unescape(body: &str, start_offset: usize) -> Result<String, LispError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                // A lone `"` inside the body only occurs as the first half
                // of a doubled `""` escape; the tokenizer guarantees the
                // body never ends mid-escape.
                match chars.next() {
                    Some((_, '"')) => out.push('"'),
                    _ => return Err(LispError::InvalidEscape("\"".to_string(), start_offset + i)),
                }
            }
            '\\' => {
                let (_, escape_char) = chars
                    .next()
                    .ok_or(LispError::UnterminatedString(start_offset))?;
                match escape_char {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'f' => out.push('\u{0C}'),
                    'v' => out.push('\u{0B}'),
                    'a' => out.push('\u{07}'),
                    'b' => out.push('\u{08}'),
                    '\\' => out.push('\\'),
                    'x' => out.push(read_hex_escape(&mut chars, 2, start_offset + i)?),
                    'u' => out.push(read_hex_escape(&mut chars, 4, start_offset + i)?),
                    'U' => out.push(read_hex_escape(&mut chars, 8, start_offset + i)?),
                    other => {
                        return Err(LispError::InvalidEscape(
                            format!("\\{other}"),
                            start_offset + i,
                        ))
                    }
                }
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn read_hex_escape(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    digits: usize,
    offset: usize,
) -> Result<char, LispError> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let (_, d) = chars
            .next()
            .ok_or(LispError::UnterminatedString(offset))?;
        let digit = d
            .to_digit(16)
            .ok_or_else(|| LispError::InvalidEscape(format!("\\x{d}"), offset))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| LispError::InvalidEscape(format!("U+{value:X}"), offset))
}

/// Escapes `value` for use as the body of a double-quoted Lisp string
/// literal: doubles `"`, and emits the named slash escapes for the
/// characters that have one. Everything else passes through unescaped
/// (mirroring `escapes.py`'s `_STRING_ESCAPES`, which only names that small
/// set; `to_lisp` never round-trips through `\x`/`\u`/`\U`).
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\"\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{0C}' => out.push_str("\\f"),
            '\u{0B}' => out.push_str("\\v"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubled_quote_unescapes_to_one_quote() {
        assert_eq!(unescape("\"\"", 0).unwrap(), "\"");
    }

    #[test]
    fn named_slash_escapes_round_trip() {
        let raw = "a\nb\tc";
        let escaped = escape(raw);
        assert_eq!(unescape(&escaped, 0).unwrap(), raw);
    }

    #[test]
    fn unicode_escape_reads_a_codepoint() {
        assert_eq!(unescape("\\u0041", 0).unwrap(), "A");
    }
}
