//! Tokenizer for the compound text grammar.
//!
//! - Sequences and maps: `[e1,e2]`, `[k1=v1,k2=v2]`
//! - Structs: `{f1,f2}`
//! - The enclosing pair is optional; a bare comma list is the unnested shorthand.
//! - Delimiters only split at the top level: commas inside `[...]`, `{...}` or
//!   `"..."` belong to the element.
//! - Quoted elements use `\"` and `\\` escapes (`\n`, `\r`, `\t` also accepted).
//!
//! Splitting returns trimmed raw pieces; callers unquote each piece right before
//! converting it, so map pairs can be split on `=` while quotes are still intact.

use crate::error::{ConvertError, Result};
use std::borrow::Cow;

/// Split the body of a compound literal into trimmed top-level pieces.
///
/// Strips one enclosing `open`/`close` pair when it spans the whole text. Empty text
/// and an empty pair both yield no pieces.
pub(crate) fn split_compound(text: &str, open: u8, close: u8) -> Result<Vec<&str>> {
    let trimmed = text.trim();
    let body = match enclosed_body(trimmed, open, close)? {
        Some(inner) => inner,
        None => trimmed,
    };
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    split_top_level(body, b',')
}

/// Split a map entry around its single top-level `=`.
pub(crate) fn split_pair(piece: &str) -> Result<(&str, &str)> {
    let parts = split_top_level(piece, b'=')?;
    match parts.as_slice() {
        [key, value] => Ok((key, value)),
        _ => Err(ConvertError::MalformedPair(piece.to_string())),
    }
}

/// Remove surrounding quotes from a piece and resolve its escapes. Unquoted pieces
/// are returned as-is.
pub(crate) fn unquote(piece: &str) -> Result<Cow<'_, str>> {
    let Some(body) = piece.strip_prefix('"') else {
        return Ok(Cow::Borrowed(piece));
    };
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' if i + 1 == body.len() => return Ok(Cow::Owned(out)),
            '"' => {
                return Err(ConvertError::syntax(
                    piece,
                    "unexpected characters after closing quote",
                ))
            }
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, 't')) => out.push('\t'),
                Some((_, esc @ ('"' | '\\'))) => out.push(esc),
                Some((_, other)) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            _ => out.push(c),
        }
    }
    Err(ConvertError::syntax(piece, "unterminated quoted element"))
}

/// If `text` starts with `open` and its matching `close` is the last byte, return
/// what lies between them.
fn enclosed_body(text: &str, open: u8, close: u8) -> Result<Option<&str>> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&open) {
        return Ok(None);
    }
    let end = matching_close(text)?;
    if end + 1 == bytes.len() && bytes[end] == close {
        Ok(Some(&text[1..end]))
    } else {
        Ok(None)
    }
}

/// Index of the bracket or brace closing the one at position 0.
fn matching_close(text: &str) -> Result<usize> {
    let bytes = text.as_bytes();
    let mut stack: Vec<u8> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = closing_quote(bytes, i)
                    .ok_or_else(|| ConvertError::syntax(text, "unterminated quote"))?;
            }
            b'[' => stack.push(b']'),
            b'{' => stack.push(b'}'),
            b @ (b']' | b'}') => {
                if stack.pop() != Some(b) {
                    return Err(ConvertError::syntax(text, "mismatched closing delimiter"));
                }
                if stack.is_empty() {
                    return Ok(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(ConvertError::syntax(text, "unbalanced brackets"))
}

/// Split on `delim` outside of quotes and nested brackets/braces; pieces are trimmed.
fn split_top_level(text: &str, delim: u8) -> Result<Vec<&str>> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut stack: Vec<u8> = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = closing_quote(bytes, i)
                    .ok_or_else(|| ConvertError::syntax(text, "unterminated quote"))?;
            }
            b'[' => stack.push(b']'),
            b'{' => stack.push(b'}'),
            b @ (b']' | b'}') => {
                if stack.pop() != Some(b) {
                    return Err(ConvertError::syntax(text, "mismatched closing delimiter"));
                }
            }
            b if b == delim && stack.is_empty() => {
                pieces.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if !stack.is_empty() {
        return Err(ConvertError::syntax(text, "unbalanced brackets"));
    }
    pieces.push(text[start..].trim());
    Ok(pieces)
}

/// Index of the quote closing the one at `open`; a backslash hides the byte after it.
fn closing_quote(bytes: &[u8], open: usize) -> Option<usize> {
    let mut escaped = false;
    bytes
        .iter()
        .enumerate()
        .skip(open + 1)
        .find(|&(_, &b)| {
            let closes = b == b'"' && !escaped;
            escaped = b == b'\\' && !escaped;
            closes
        })
        .map(|(i, _)| i)
}
