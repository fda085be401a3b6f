//! CSV tokenizer and field writer
//!
//! Quoting follows the usual RFC 4180 shape: a field is wrapped in double
//! quotes when it contains a comma, a quote or a line break, and embedded
//! quotes are doubled. Parsing is best-effort and never fails.

use std::borrow::Cow;

/// Split one logical CSV record into its fields.
///
/// A `"` outside quotes opens a quoted section, even mid-field. Inside one,
/// `""` is a literal quote and a lone `"` closes it. A quote left open at the
/// end of the record is treated as closed there. The result always holds at
/// least one field.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if inside_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    inside_quotes = false;
                }
            }
            '"' => inside_quotes = true,
            ',' if !inside_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    fields.push(current);
    fields
}

/// Escape a value for CSV output
pub fn format_field(value: &str) -> Cow<'_, str> {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Split a document into logical records.
///
/// Breaks on `\r` or `\n`. A line break is kept inside a record only when it
/// falls in a quoted field that opened at the start of a field and later
/// closes cleanly. Otherwise the damage stays on one physical line: the
/// record ends at the line break and `parse_line` closes the quote there.
/// Empty records are dropped.
pub fn split_records(text: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let end = record_end(rest)
            .unwrap_or_else(|| rest.find(|c: char| c == '\r' || c == '\n').unwrap_or(rest.len()));
        if end > 0 {
            records.push(&rest[..end]);
        }
        // Skip the single-byte terminator, if any.
        rest = rest.get(end + 1..).unwrap_or("");
    }

    records
}

/// Byte length of the record at the start of `s`, or `None` when a quoted
/// field carried across a line break never closes cleanly.
fn record_end(s: &str) -> Option<usize> {
    let mut inside_quotes = false;
    // The open quote started a field, so it may span line breaks.
    let mut may_span = false;
    // The open quoted field already swallowed a line break.
    let mut spanned = false;
    let mut field_start = true;
    let mut just_closed = false;

    for (i, c) in s.char_indices() {
        if just_closed && spanned && !matches!(c, ',' | '"' | '\r' | '\n') {
            return None;
        }
        match c {
            '"' if inside_quotes => {
                inside_quotes = false;
                just_closed = true;
                field_start = false;
                continue;
            }
            '"' => {
                // A quote right after a closing one is an escaped `""`.
                if !just_closed {
                    may_span = field_start;
                    spanned = false;
                }
                inside_quotes = true;
            }
            ',' if !inside_quotes => {
                field_start = true;
                just_closed = false;
                spanned = false;
                continue;
            }
            '\r' | '\n' if inside_quotes && may_span => spanned = true,
            '\r' | '\n' => return Some(i),
            _ => {}
        }
        field_start = false;
        just_closed = false;
    }

    if inside_quotes && spanned {
        None
    } else {
        Some(s.len())
    }
}
