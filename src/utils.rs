//! String and byte helpers shared by the value codec, parser and command
//! generator.

use crate::error::{RegistryError, Result};
use encoding_rs::UTF_8;
use std::borrow::Cow;

/// Escapes backslashes and double quotes for use inside a quoted argument.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_string`].
///
/// `\\` and `\"` are decoded in a single left-to-right pass. Any other
/// backslash sequence, and a lone trailing backslash, is kept verbatim.
pub fn unescape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == '"' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Strips one surrounding pair of double quotes (each side optional) and
/// unescapes the content.
pub fn parse_quoted_string(s: &str) -> String {
    let s = s.strip_prefix('"').unwrap_or(s);
    let s = s.strip_suffix('"').unwrap_or(s);
    unescape_string(s)
}

/// Parses a comma-separated list of hex byte literals (`ab,cd,ef`).
///
/// Each literal is one or two hex digits. An empty input is an empty list.
pub fn parse_hex_list(s: &str) -> Result<Vec<u8>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|digits| {
            if digits.is_empty()
                || digits.len() > 2
                || !digits.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(RegistryError::invalid_data(format!(
                    "failed to parse as binary('{}'): invalid byte '{}'",
                    s, digits
                )));
            }
            u8::from_str_radix(digits, 16).map_err(|e| {
                RegistryError::invalid_data(format!("failed to parse as binary('{}'): {}", s, e))
            })
        })
        .collect()
}

/// Formats bytes as comma-separated two-digit lower-case hex (`ab,cd,ef`).
pub fn format_hex_list(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(",")
}

/// Returns true if `s` is a non-empty run of ASCII hex digits.
pub fn is_hex_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decodes raw file contents into text.
///
/// UTF-8 is assumed unless a byte-order mark says otherwise; `regedit`
/// writes UTF-16LE with a BOM. Malformed sequences are replaced with U+FFFD.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (text, encoding, had_errors) = UTF_8.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "Replaced malformed byte sequences while decoding");
    }
    text
}
