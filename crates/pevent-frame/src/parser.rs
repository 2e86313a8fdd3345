//! Event file line parser.
//!
//! One event per line, seven integer fields separated by spaces, with an
//! optional `#` comment:
//!
//! ```text
//! 0x04 0x01 0x30 0x01 0x59 0x00 0x00   # temperature upper critical going high
//! ```
//!
//! Fields accept C integer literal syntax (decimal, `0x` hex, leading-`0`
//! octal). In the default lenient mode a field is read like `strtol`: the
//! longest valid prefix counts, junk reads as 0 and the value is truncated to
//! its low byte. Strict mode rejects anything that is not a complete literal
//! in `0..=255`.

use std::fmt::Write as _;

use crate::codec::EventFields;
use crate::error::ParseError;

/// Field validation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// `strtol`-style reading, truncated to one byte.
    #[default]
    Lenient,
    /// Every field must be a complete literal that fits in one byte.
    Strict,
}

/// A successfully classified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLine {
    /// Nothing but whitespace and/or a comment. Skip it.
    Blank,
    Event(EventFields),
}

/// Parse one line in lenient mode.
pub fn parse_line(raw: &str) -> Result<ParsedLine, ParseError> {
    parse_line_with(raw, ParseMode::Lenient)
}

/// Parse one line with an explicit validation mode.
///
/// Tokens after the seventh are ignored.
pub fn parse_line_with(raw: &str, mode: ParseMode) -> Result<ParsedLine, ParseError> {
    let content = strip_comment(raw).trim_matches(is_c_space);
    if content.is_empty() {
        return Ok(ParsedLine::Blank);
    }

    let mut fields = [0u8; EventFields::LEN];
    let mut found = 0;
    for (index, token) in content
        .split(' ')
        .filter(|t| !t.is_empty())
        .take(EventFields::LEN)
        .enumerate()
    {
        fields[index] = parse_field(index, token, mode)?;
        found += 1;
    }

    if found < EventFields::LEN {
        return Err(ParseError::TooFewFields {
            found,
            partial: fields,
        });
    }

    Ok(ParsedLine::Event(EventFields::from_bytes(fields)))
}

/// Read a complete integer literal (decimal, `0x` hex or leading-`0` octal)
/// that fits in one byte.
pub fn parse_byte_literal(token: &str) -> Option<u8> {
    let literal = parse_c_integer(token.trim_matches(is_c_space));
    if !literal.complete {
        return None;
    }
    u8::try_from(literal.value).ok()
}

/// Render bytes as space-separated lowercase hex pairs.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Cut the line at the first `#` not preceded by a backslash.
fn strip_comment(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    let cut = bytes
        .iter()
        .enumerate()
        .position(|(i, &b)| b == b'#' && (i == 0 || bytes[i - 1] != b'\\'));
    match cut {
        Some(i) => &raw[..i],
        None => raw,
    }
}

/// The classic C `isspace` set.
fn is_c_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

fn parse_field(index: usize, token: &str, mode: ParseMode) -> Result<u8, ParseError> {
    let literal = parse_c_integer(token);
    match mode {
        ParseMode::Lenient => Ok(literal.value as u8),
        ParseMode::Strict => {
            if !literal.complete {
                return Err(ParseError::InvalidToken {
                    index,
                    token: token.to_string(),
                });
            }
            u8::try_from(literal.value).map_err(|_| ParseError::OutOfRange {
                index,
                token: token.to_string(),
            })
        }
    }
}

/// Result of reading an integer literal the way `strtol(s, &end, 0)` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CInteger {
    /// Value clamped to the `i64` range.
    value: i64,
    /// At least one digit was read and nothing followed the literal.
    complete: bool,
}

fn parse_c_integer(token: &str) -> CInteger {
    // Magnitudes saturate here, well past i64::MAX, so clamping stays exact.
    const LIMIT: u128 = 1 << 64;

    let s = token.trim_start_matches(is_c_space).as_bytes();
    let mut pos = 0;

    let negative = match s.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let rest = &s[pos..];
    let base: u32 = if rest.len() > 2
        && rest[0] == b'0'
        && (rest[1] == b'x' || rest[1] == b'X')
        && rest[2].is_ascii_hexdigit()
    {
        pos += 2;
        16
    } else if rest.first() == Some(&b'0') {
        8
    } else {
        10
    };

    let mut magnitude: u128 = 0;
    let mut digits = 0;
    while let Some(d) = s.get(pos).and_then(|&b| (b as char).to_digit(base)) {
        magnitude = (magnitude * u128::from(base) + u128::from(d)).min(LIMIT);
        digits += 1;
        pos += 1;
    }

    let signed = if negative {
        -(magnitude as i128)
    } else {
        magnitude as i128
    };
    let value = signed.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;

    CInteger {
        value,
        complete: digits > 0 && pos == s.len(),
    }
}
