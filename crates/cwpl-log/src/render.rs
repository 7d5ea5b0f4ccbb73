// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report entry rendering
//!
//! A report template is free text with `{field}` placeholders naming record
//! fields (see [`LogRecord::field`]). `{{` and `}}` stand for literal braces.
//! After substitution every two-character `\n` sequence becomes a line break,
//! so templates kept on a single line in a settings store can still produce
//! multi-line entries.
//!
//! # Example
//!
//! ```no_run
//! use cwpl_log::render::render;
//! # fn demo(record: &cwpl_log::LogRecord) -> Result<(), cwpl_log::TemplateFieldError> {
//! let text = render(record, r"*Commit*: {commit}\n{message}\n")?;
//! # Ok(())
//! # }
//! ```

use crate::error::TemplateFieldError;
use crate::record::LogRecord;

/// Piece of a parsed template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied as is
    Text(&'a str),
    /// Placeholder naming a record field
    Field(&'a str),
}

/// Split a template into text and placeholder segments
///
/// # Errors
///
/// Returns `UnclosedPlaceholder` for a `{` without a matching `}` and
/// `UnmatchedBrace` for a single `}` outside a placeholder.
pub fn parse_template(template: &str) -> Result<Vec<Segment<'_>>, TemplateFieldError> {
    let mut segments = Vec::new();
    let bytes = template.as_bytes();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' if bytes.get(i + 1) == Some(&b'{') => {
                push_text(&mut segments, &template[text_start..=i]);
                i += 2;
                text_start = i;
            }
            b'{' => {
                push_text(&mut segments, &template[text_start..i]);
                let close = template[i + 1..]
                    .find('}')
                    .ok_or(TemplateFieldError::UnclosedPlaceholder { offset: i })?;
                let name = &template[i + 1..i + 1 + close];
                if name.contains('{') {
                    return Err(TemplateFieldError::UnclosedPlaceholder { offset: i });
                }
                segments.push(Segment::Field(name));
                i += close + 2;
                text_start = i;
            }
            b'}' if bytes.get(i + 1) == Some(&b'}') => {
                push_text(&mut segments, &template[text_start..=i]);
                i += 2;
                text_start = i;
            }
            b'}' => return Err(TemplateFieldError::UnmatchedBrace { offset: i }),
            _ => i += 1,
        }
    }
    push_text(&mut segments, &template[text_start..]);
    Ok(segments)
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
}

/// Field names referenced by a template, in order of appearance
///
/// # Errors
///
/// Returns the same errors as [`parse_template`].
pub fn placeholders(template: &str) -> Result<Vec<&str>, TemplateFieldError> {
    Ok(parse_template(template)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Field(name) => Some(name),
            Segment::Text(_) => None,
        })
        .collect())
}

/// Check that a template only references names in `fields`
///
/// # Errors
///
/// Returns `UnknownField` for the first name not in `fields`, or a syntax error.
pub fn validate_template(template: &str, fields: &[&str]) -> Result<(), TemplateFieldError> {
    match placeholders(template)?
        .into_iter()
        .find(|name| !fields.contains(name))
    {
        Some(name) => Err(TemplateFieldError::UnknownField {
            field: name.to_string(),
        }),
        None => Ok(()),
    }
}

fn render_segments(
    record: &LogRecord,
    segments: &[Segment<'_>],
    out: &mut String,
) -> Result<(), TemplateFieldError> {
    let start = out.len();
    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Field(name) => {
                let value = record
                    .field(name)
                    .ok_or_else(|| TemplateFieldError::UnknownField {
                        field: (*name).to_string(),
                    })?;
                out.push_str(&value);
            }
        }
    }
    // expands substituted values too, non-string extras included
    let expanded = out[start..].replace("\\n", "\n");
    out.truncate(start);
    out.push_str(&expanded);
    Ok(())
}

/// Expand `template` against one record
///
/// # Errors
///
/// Returns a `TemplateFieldError` if the template is malformed or names a
/// field the record does not have.
pub fn render(record: &LogRecord, template: &str) -> Result<String, TemplateFieldError> {
    let segments = parse_template(template)?;
    let mut out = String::new();
    render_segments(record, &segments, &mut out)?;
    Ok(out)
}

/// Expand `template` against every record and concatenate the results
///
/// Nothing is returned unless every record renders, so a report is never
/// left with entries silently missing.
///
/// # Errors
///
/// Returns the first `TemplateFieldError` encountered.
pub fn render_all(records: &[LogRecord], template: &str) -> Result<String, TemplateFieldError> {
    let segments = parse_template(template)?;
    let mut out = String::new();
    for record in records {
        render_segments(record, &segments, &mut out)?;
    }
    Ok(out)
}
