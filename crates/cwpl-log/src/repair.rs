// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repair of `git log --pretty=format:` object streams
//!
//! The log format template makes git print one pseudo-JSON object per commit,
//! each followed by a comma, with no enclosing array:
//!
//! ```text
//! {"commit": "%H", "author": "%an", "date": "%ad", "message": "%B"},
//! ```
//!
//! git substitutes the placeholders without any escaping, so a commit body
//! spreads over several physical lines and may contain bare double quotes.
//! [`repair`] walks the stream one character at a time, tracking whether it is
//! between objects, inside an object, or inside a string value, and rewrites
//! it into a JSON array:
//!
//! - raw line breaks inside a value become the two-character escape `\n`
//!   (`\r\n` counts as one break) and other control characters get JSON escapes;
//! - a `"` inside a value only closes it when what follows is the rest of the
//!   object: `, "key":` for a template key the object has not had yet, or `}`
//!   followed by end of output or `,` and the next object; any other quote is
//!   escaped as `\"`;
//! - valid JSON escapes already present in the text are kept as they are and
//!   any other backslash is doubled.
//!
//! Keeping existing escapes means a commit message in which someone typed the
//! two characters `\n` decodes to a line break, exactly like a real line break
//! would. The two cannot be told apart once git has printed them.
//!
//! # Example
//!
//! ```
//! use cwpl_log::repair::repair;
//!
//! let raw = "{\"commit\": \"abc\", \"message\": \"say \"hi\"\nthen leave\"},";
//! let fixed = repair(raw).unwrap();
//! assert_eq!(
//!     fixed,
//!     r#"[{"commit": "abc", "message": "say \"hi\"\nthen leave"}]"#
//! );
//! ```

use std::collections::BTreeSet;

use crate::error::StreamError;
use crate::record::REQUIRED_FIELDS;

/// Key that must be present in every object
pub const MESSAGE_KEY: &str = "message";

/// Turn raw log output into a JSON array literal
///
/// Assumes the template produces only `commit`, `author`, `date` and
/// `message`. Use [`repair_with_keys`] for templates with extra keys.
///
/// # Errors
///
/// See [`repair_with_keys`].
pub fn repair(raw: &str) -> Result<String, StreamError> {
    let keys: BTreeSet<String> = REQUIRED_FIELDS.iter().map(ToString::to_string).collect();
    repair_with_keys(raw, &keys)
}

/// Turn raw log output into a JSON array literal, given the template's keys
///
/// Empty or whitespace-only output yields `[]`.
///
/// # Errors
///
/// Returns a [`StreamError`] when the output does not follow the
/// object-per-entry shape, a string or object is left open, or an object has
/// no `message` key.
pub fn repair_with_keys(raw: &str, keys: &BTreeSet<String>) -> Result<String, StreamError> {
    if raw.trim().is_empty() {
        return Ok("[]".to_string());
    }
    Repairer::new(raw, keys).run()
}

struct Repairer<'a, 'k> {
    src: &'a str,
    keys: &'k BTreeSet<String>,
    /// Keys of the object being read
    seen: Vec<&'a str>,
    pos: usize,
    out: String,
}

impl<'a, 'k> Repairer<'a, 'k> {
    fn new(src: &'a str, keys: &'k BTreeSet<String>) -> Self {
        Self {
            src,
            keys,
            seen: Vec::new(),
            pos: 0,
            out: String::with_capacity(src.len() + src.len() / 8 + 2),
        }
    }

    fn run(mut self) -> Result<String, StreamError> {
        self.out.push('[');
        let mut index = 0;
        loop {
            self.skip_ws();
            match self.peek() {
                None => break,
                Some('{') => {
                    if index > 0 {
                        self.out.push(',');
                    }
                    self.object(index)?;
                    index += 1;
                }
                Some(found) => {
                    return Err(StreamError::UnexpectedChar {
                        offset: self.pos,
                        found,
                        expected: "'{'",
                    });
                }
            }
            // one separating comma, which is also the trailing comma of the last entry
            self.skip_ws();
            if self.peek() == Some(',') {
                self.bump();
            }
        }
        self.out.push(']');
        Ok(self.out)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    /// Whitespace inside an object is valid JSON, so it is kept
    fn copy_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.out.push(c);
            self.bump();
        }
    }

    fn object(&mut self, index: usize) -> Result<(), StreamError> {
        let start = self.pos;
        self.bump();
        self.out.push('{');
        self.seen.clear();

        let mut has_message = false;
        self.copy_ws();
        if self.peek() == Some('}') {
            self.bump();
            self.out.push('}');
            return Err(StreamError::MissingMessageField { index });
        }

        loop {
            self.copy_ws();
            let key = self.key(start)?;
            has_message |= key == MESSAGE_KEY;
            self.seen.push(key);

            self.copy_ws();
            match self.bump() {
                Some(':') => self.out.push(':'),
                Some(found) => {
                    return Err(StreamError::UnexpectedChar {
                        offset: self.pos - found.len_utf8(),
                        found,
                        expected: "':'",
                    });
                }
                None => return Err(StreamError::UnterminatedObject { offset: start }),
            }

            self.copy_ws();
            match self.peek() {
                Some('"') => self.string_value()?,
                Some(_) => self.bare_value()?,
                None => return Err(StreamError::UnterminatedObject { offset: start }),
            }

            self.copy_ws();
            match self.bump() {
                Some(',') => self.out.push(','),
                Some('}') => {
                    self.out.push('}');
                    break;
                }
                Some(found) => {
                    return Err(StreamError::UnexpectedChar {
                        offset: self.pos - found.len_utf8(),
                        found,
                        expected: "',' or '}'",
                    });
                }
                None => return Err(StreamError::UnterminatedObject { offset: start }),
            }
        }

        if has_message {
            Ok(())
        } else {
            Err(StreamError::MissingMessageField { index })
        }
    }

    fn key(&mut self, object_start: usize) -> Result<&'a str, StreamError> {
        let open = self.pos;
        match self.bump() {
            Some('"') => {}
            Some(found) => {
                return Err(StreamError::UnexpectedChar {
                    offset: open,
                    found,
                    expected: "'\"' starting a key",
                });
            }
            None => {
                return Err(StreamError::UnterminatedObject {
                    offset: object_start,
                });
            }
        }

        let body = &self.src[self.pos..];
        let end = body
            .find(['"', '\n'])
            .filter(|&end| body[end..].starts_with('"'))
            .ok_or(StreamError::UnterminatedString { offset: open })?;
        let key = &body[..end];

        self.out.push('"');
        self.out.push_str(key);
        self.out.push('"');
        self.pos += end + 1;
        Ok(key)
    }

    /// Numbers and literals are copied up to the next delimiter
    fn bare_value(&mut self) -> Result<(), StreamError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ',' || c == '}' || c.is_whitespace() {
                break;
            }
            self.out.push(c);
            self.bump();
        }
        if self.pos == start {
            // only reachable on a delimiter right after the colon
            let found = self.peek().unwrap_or(',');
            return Err(StreamError::UnexpectedChar {
                offset: start,
                found,
                expected: "a value",
            });
        }
        Ok(())
    }

    fn string_value(&mut self) -> Result<(), StreamError> {
        let open = self.pos;
        self.bump();
        self.out.push('"');

        loop {
            let Some(c) = self.bump() else {
                return Err(StreamError::UnterminatedString { offset: open });
            };
            match c {
                '"' => {
                    if self.closes_value(&self.src[self.pos..]) {
                        self.out.push('"');
                        return Ok(());
                    }
                    self.out.push_str("\\\"");
                }
                '\\' => self.backslash(),
                '\r' => {
                    if self.peek() == Some('\n') {
                        self.bump();
                    }
                    self.out.push_str("\\n");
                }
                '\n' => self.out.push_str("\\n"),
                '\t' => self.out.push_str("\\t"),
                c if u32::from(c) < 0x20 => {
                    self.out.push_str(&format!("\\u{:04x}", u32::from(c)));
                }
                c => self.out.push(c),
            }
        }
    }

    /// Handle a backslash whose own character has already been consumed
    fn backslash(&mut self) {
        let rest = &self.src[self.pos..];
        match self.peek() {
            // `\"` is an escaped quote unless that quote is the closing one
            Some('"') => {
                if self.closes_value(&rest[1..]) {
                    self.out.push_str("\\\\");
                } else {
                    self.out.push_str("\\\"");
                    self.bump();
                }
            }
            Some(c @ ('\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')) => {
                self.out.push('\\');
                self.out.push(c);
                self.bump();
            }
            Some('u') if is_unicode_escape(&rest[1..]) => {
                self.out.push('\\');
                self.out.push_str(&rest[..5]);
                self.pos += 5;
            }
            _ => self.out.push_str("\\\\"),
        }
    }

    /// Decide whether a quote followed by `rest` closes the current value
    fn closes_value(&self, rest: &str) -> bool {
        let rest = rest.trim_start();
        if rest.is_empty() {
            return true;
        }
        if let Some(after) = rest.strip_prefix('}') {
            let after = after.trim_start();
            if after.is_empty() {
                return true;
            }
            let Some(after) = after.strip_prefix(',') else {
                return false;
            };
            let after = after.trim_start();
            return after.is_empty()
                || after
                    .strip_prefix('{')
                    .and_then(|next| key_name(next.trim_start()))
                    .is_some();
        }
        if let Some(after) = rest.strip_prefix(',') {
            return key_name(after.trim_start()).is_some_and(|key| {
                self.keys.contains(key) && !self.seen.iter().any(|seen| *seen == key)
            });
        }
        false
    }
}

/// Name of a `"name"` followed by a colon, all on one line
fn key_name(s: &str) -> Option<&str> {
    let body = s.strip_prefix('"')?;
    let end = body.find('"')?;
    let name = &body[..end];
    (!name.contains('\n') && body[end + 1..].trim_start().starts_with(':')).then_some(name)
}

fn is_unicode_escape(s: &str) -> bool {
    s.len() >= 4 && s.as_bytes()[..4].iter().all(u8::is_ascii_hexdigit)
}
