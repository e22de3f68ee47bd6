//! Line-oriented parser for Wine `.reg` files.
//!
//! ## File Layout
//!
//! ```text
//! WINE REGISTRY Version 2
//! ;; All keys relative to \\Machine
//!
//! #arch=win32
//!
//! [Software\\Wine\\Fonts] 1600000000
//! #time=1d68b2c3e4f5a60
//! @="default value"
//! "LogPixels"=dword:00000060
//! "Blob"=hex:00,01,02,03,04,05,06,07,08,09,0a,0b,0c,0d,0e,0f,\
//!   10,11,12,13
//! ```
//!
//! The header line is mandatory. Key headers carry a modification timestamp,
//! value lines are `name=data`, `;` starts a comment and a trailing `\`
//! continues a logical line onto the next physical one. Lines of any other
//! shape (`#time=`, `#arch=`, ...) are skipped.

use crate::error::{RegistryError, Result};
use crate::registry::{DataName, Key, Registry};
use crate::utils::{decode_text, parse_quoted_string, unescape_string};
use crate::value::Data;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::{FromStr, Lines};
use tracing::{debug, info, instrument, trace, warn};

/// First line of every Wine registry file.
pub const FILE_HEADER: &str = "WINE REGISTRY Version 2";

/// Marker for the unnamed value on a value line.
pub const UNNAMED_DATA_NAME: &str = "@";

/// A logical line: one or more physical lines joined by continuations.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogicalLine {
    /// 1-based number of the first physical line.
    line: usize,
    text: String,
}

/// Splits the body of a registry file into trimmed logical lines.
struct LineScanner<'a> {
    lines: Lines<'a>,
    line_no: usize,
}

impl<'a> LineScanner<'a> {
    /// Consumes leading blank lines and the header.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotARegistryFile`] if the first non-blank line
    /// is not [`FILE_HEADER`].
    fn new(text: &'a str) -> Result<Self> {
        let mut scanner = Self {
            lines: text.lines(),
            line_no: 0,
        };
        loop {
            match scanner.next_physical() {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) if line == FILE_HEADER => return Ok(scanner),
                _ => return Err(RegistryError::NotARegistryFile),
            }
        }
    }

    fn next_physical(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line)
    }
}

impl Iterator for LineScanner<'_> {
    type Item = LogicalLine;

    fn next(&mut self) -> Option<LogicalLine> {
        let first = self.next_physical()?.trim();
        let line = self.line_no;

        let Some(head) = first.strip_suffix('\\') else {
            return Some(LogicalLine {
                line,
                text: first.to_string(),
            });
        };

        let mut text = head.to_string();
        loop {
            let Some(physical) = self.next_physical() else {
                warn!(line, "Input ended inside a continued line, discarding it");
                return None;
            };
            let physical = physical.trim();
            match physical.strip_suffix('\\') {
                Some(part) => text.push_str(part),
                None => {
                    text.push_str(physical);
                    return Some(LogicalLine { line, text });
                }
            }
        }
    }
}

/// Parses the text of a registry file.
///
/// # Errors
///
/// Fails on a missing header, a value before any key, a malformed key or
/// value line, or data that does not decode. No partial registry is returned.
#[instrument(skip(input), fields(len = input.len()))]
pub fn parse(input: &str) -> Result<Registry> {
    let mut registry = Registry::new();
    let mut current: Option<Key> = None;

    for LogicalLine { line, text } in LineScanner::new(input)? {
        if text.starts_with('[') {
            let key = parse_key_line(line, &text)?;
            trace!(line, key = %key, "Key header");
            registry.entry(key.clone());
            current = Some(key);
        } else if text.starts_with('"') || text.starts_with(UNNAMED_DATA_NAME) {
            let key = current.as_ref().ok_or(RegistryError::NoCurrentKey { line })?;
            let (name, raw) = split_value_line(line, &text)?;
            let data = Data::parse(raw)
                .map_err(|e| RegistryError::data_parse(line, key.as_str(), &name.to_string(), e))?;
            trace!(line, key = %key, name = %name, data_type = %data.data_type(), "Value");
            registry.entry(key.clone()).insert(name, data);
        } else if text.starts_with(';') {
            // comment
        } else if !text.is_empty() {
            trace!(line, "Skipping unrecognized line");
        }
    }

    debug!(keys = registry.len(), "Parsed registry");
    Ok(registry)
}

/// Parses `[<key>] <timestamp>` and returns the unescaped key.
fn parse_key_line(line: usize, text: &str) -> Result<Key> {
    let invalid = || RegistryError::InvalidKeyLine {
        line,
        text: text.to_string(),
    };

    // The body may itself contain `]`; the header closes at the rightmost
    // `]` followed by whitespace and a timestamp.
    let close = text
        .match_indices(']')
        .rev()
        .map(|(idx, _)| idx)
        .find(|&idx| is_timestamp_suffix(&text[idx + 1..]))
        .ok_or_else(invalid)?;

    let body = &text[1..close];
    if body.is_empty() {
        return Err(invalid());
    }
    Ok(Key::new(parse_quoted_string(body)))
}

/// Returns true for whitespace followed by at least one decimal digit.
fn is_timestamp_suffix(rest: &str) -> bool {
    let trimmed = rest.trim_start();
    trimmed.len() < rest.len() && trimmed.starts_with(|c: char| c.is_ascii_digit())
}

/// Splits `"name"=data` or `@=data` into the value name and raw data text.
fn split_value_line(line: usize, text: &str) -> Result<(DataName, &str)> {
    let invalid = || RegistryError::InvalidValueLine {
        line,
        text: text.to_string(),
    };

    let (name, rest) = if let Some(rest) = text.strip_prefix(UNNAMED_DATA_NAME) {
        (DataName::Default, rest)
    } else {
        let end = closing_quote(text).ok_or_else(invalid)?;
        let name = unescape_string(&text[1..end]);
        if name.is_empty() {
            return Err(invalid());
        }
        (DataName::Named(name), &text[end + 1..])
    };

    match rest.strip_prefix('=') {
        Some(raw) if !raw.is_empty() => Ok((name, raw)),
        _ => Err(invalid()),
    }
}

/// Finds the byte index of the quote closing the string opened at index 0.
fn closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, c) in text.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(idx),
            _ => {}
        }
    }
    None
}

impl Registry {
    /// Parses a registry from text.
    ///
    /// # Errors
    ///
    /// See [`parse`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wine_regdiff::{Data, DataName, Registry};
    ///
    /// let reg = Registry::parse_str("WINE REGISTRY Version 2\n\n[\"K\"] 0\n\"V\"=dword:0000002a\n").unwrap();
    /// let value = reg.get("K").unwrap();
    /// assert_eq!(value.get(&DataName::named("V")), Some(&Data::Dword(42)));
    /// ```
    pub fn parse_str(text: &str) -> Result<Self> {
        parse(text)
    }

    /// Reads and parses a registry from a byte stream.
    ///
    /// The stream is decoded as UTF-8 unless it starts with a byte-order mark.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the content does not parse.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        parse(&decode_text(&bytes))
    }

    /// Opens and parses a registry file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - File is not a Wine registry file
    /// - A key or value line is malformed
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wine_regdiff::Registry;
    ///
    /// let registry = Registry::open("user.reg").unwrap();
    /// ```
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        info!("Opening registry file");
        let bytes = fs::read(&path)?;
        debug!(size = bytes.len(), "File read");
        parse(&decode_text(&bytes))
    }
}

impl FromStr for Registry {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Value;

    fn logical_lines(text: &str) -> Vec<(usize, String)> {
        LineScanner::new(text)
            .unwrap()
            .map(|l| (l.line, l.text))
            .collect()
    }

    #[test]
    fn test_header_required() {
        assert!(matches!(parse(""), Err(RegistryError::NotARegistryFile)));
        assert!(matches!(parse("\n\n"), Err(RegistryError::NotARegistryFile)));
        assert!(matches!(
            parse("REGEDIT4\n[K] 0\n"),
            Err(RegistryError::NotARegistryFile)
        ));
        assert!(matches!(
            parse(" WINE REGISTRY Version 2\n"),
            Err(RegistryError::NotARegistryFile)
        ));
    }

    #[test]
    fn test_header_after_blank_lines_and_crlf() {
        let reg = parse("\r\n\nWINE REGISTRY Version 2\r\n[K] 0\r\n").unwrap();
        assert!(reg.contains_key("K"));
    }

    #[test]
    fn test_continuation_joins_without_separator() {
        let lines = logical_lines("WINE REGISTRY Version 2\n\"A\"=hex:01,\\\n  02,\\\n  03\n;x\n");
        assert_eq!(
            lines,
            vec![(2, "\"A\"=hex:01,02,03".to_string()), (5, ";x".to_string())]
        );
    }

    #[test]
    fn test_pending_continuation_at_eof_is_dropped() {
        let reg = parse("WINE REGISTRY Version 2\n[K] 0\n\"A\"=dword:00000001\n\"B\"=hex:01,\\\n").unwrap();
        let value = reg.get("K").unwrap();
        assert_eq!(value.len(), 1);
        assert!(value.contains(&DataName::named("A")));
    }

    #[test]
    fn test_key_line() {
        assert_eq!(parse_key_line(1, r"[Software\\Wine] 1600000000").unwrap().as_str(), r"Software\Wine");
        assert_eq!(parse_key_line(1, r#"["Quoted \"Key\""] 0"#).unwrap().as_str(), r#"Quoted "Key""#);
        assert_eq!(parse_key_line(1, "[A]B] 12 extra").unwrap().as_str(), "A]B");
        assert!(parse_key_line(1, "[Key]").is_err());
        assert!(parse_key_line(1, "[Key] abc").is_err());
        assert!(parse_key_line(1, "[Key]123").is_err());
        assert!(parse_key_line(1, "[] 0").is_err());
    }

    #[test]
    fn test_value_line() {
        let (name, raw) = split_value_line(1, r#""Name"="data""#).unwrap();
        assert_eq!(name, DataName::named("Name"));
        assert_eq!(raw, r#""data""#);

        let (name, raw) = split_value_line(1, "@=dword:00000001").unwrap();
        assert_eq!(name, DataName::Default);
        assert_eq!(raw, "dword:00000001");

        let (name, raw) = split_value_line(1, r#""a\"=b"="c=d""#).unwrap();
        assert_eq!(name, DataName::named(r#"a"=b"#));
        assert_eq!(raw, r#""c=d""#);

        let (name, _) = split_value_line(1, r#""@"=dword:00000001"#).unwrap();
        assert_eq!(name, DataName::named("@"));

        assert!(split_value_line(1, r#""Name""#).is_err());
        assert!(split_value_line(1, r#""Name"="#).is_err());
        assert!(split_value_line(1, r#""unterminated=1"#).is_err());
        assert!(split_value_line(1, r#"""=dword:00000001"#).is_err());
        assert!(split_value_line(1, "@dword").is_err());
    }

    #[test]
    fn test_value_before_key() {
        let err = parse("WINE REGISTRY Version 2\n\"A\"=dword:00000001\n").unwrap_err();
        assert!(matches!(err, RegistryError::NoCurrentKey { line: 2 }));
    }

    #[test]
    fn test_bad_data_is_tagged() {
        let err = parse("WINE REGISTRY Version 2\n[Parent\\\\Key] 0\n\"Name\"=dword:zz\n").unwrap_err();
        match err {
            RegistryError::DataParse { line, key, name, .. } => {
                assert_eq!(line, 3);
                assert_eq!(key, r"Parent\Key");
                assert_eq!(name, "Name");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_key_blocks_merge_and_last_wins() {
        let reg = parse(
            "WINE REGISTRY Version 2\n\
             [K] 1\n\"A\"=dword:00000001\n\"B\"=dword:00000002\n\
             [Other] 1\n\
             [K] 2\n\"A\"=dword:00000003\n",
        )
        .unwrap();
        assert_eq!(reg.len(), 2);
        assert_eq!(
            reg.get("K").unwrap(),
            &Value::new()
                .with("A", Data::Dword(3))
                .with("B", Data::Dword(2))
        );
        assert!(reg.get("Other").unwrap().is_empty());
    }

    #[test]
    fn test_unrecognized_lines_ignored() {
        let reg = parse(
            "WINE REGISTRY Version 2\n\
             ;; All keys relative to \\\\Machine\n\
             #arch=win32\n\
             [K] 1\n\
             #time=1d68b2c3e4f5a60\n\
             garbage line\n\
             @=\"default\"\n",
        )
        .unwrap();
        let value = reg.get("K").unwrap();
        assert_eq!(value.len(), 1);
        assert_eq!(value.get(&DataName::Default), Some(&Data::String("default".into())));
    }
}
