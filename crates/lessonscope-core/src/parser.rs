//! Heading-driven parser for model responses.
//!
//! The instruction template asks the model to answer under nine fixed
//! sub-headings (`Key vocabulary terms:`, `Definitions:`, ...). The parser
//! walks the response once, line by line, and files each body line under the
//! most recent recognized heading. It never fails: text without any
//! recognized heading simply yields an empty record.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::model::{Field, ParsedRecord};

static HEADER_PATTERN: OnceLock<regex::Regex> = OnceLock::new();

#[allow(clippy::expect_used)]
fn header_pattern() -> &'static regex::Regex {
    HEADER_PATTERN.get_or_init(|| {
        regex::Regex::new(r"(?i)^[\s\x1F]*(?P<header>.+?):[\s\x1F]*$")
            .expect("static header pattern is valid")
    })
}

/// Parse a model response into a [`ParsedRecord`].
///
/// Pure function of its input; safe to call from any thread.
pub fn parse(text: &str) -> ParsedRecord {
    parse_with_diagnostics(text).record
}

/// Result of parsing, with details about content the parser dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOutcome {
    /// The extracted record.
    pub record: ParsedRecord,
    /// Header-like lines whose label is not one of the nine known headings,
    /// in the order they appeared (colon stripped, trimmed).
    pub unrecognized_headers: Vec<String>,
    /// Body lines dropped because no recognized heading was active.
    pub discarded_lines: usize,
}

impl ParseOutcome {
    /// `true` when nothing was dropped or ignored while parsing.
    pub fn is_clean(&self) -> bool {
        self.unrecognized_headers.is_empty() && self.discarded_lines == 0
    }
}

/// Parse a model response, also reporting unrecognized headings and the
/// number of discarded body lines.
pub fn parse_with_diagnostics(text: &str) -> ParseOutcome {
    let mut values: [String; 9] = Default::default();
    let mut current: Option<Field> = None;
    let mut unrecognized_headers = Vec::new();
    let mut discarded_lines = 0usize;

    for raw in split_lines(text) {
        let line = raw.trim_matches(is_space);
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = header_pattern().captures(line) {
            let label = caps
                .name("header")
                .map_or("", |m| m.as_str())
                .trim_matches(is_space);
            current = Field::from_label(label);
            if current.is_none() {
                tracing::debug!(label, "unrecognized header, ignoring until next known header");
                unrecognized_headers.push(label.to_string());
            }
            continue;
        }

        let Some(field) = current else {
            discarded_lines += 1;
            continue;
        };

        let content = strip_bullet(line);
        let slot = &mut values[field as usize];
        if !slot.is_empty() {
            slot.push('\n');
        }
        slot.push_str(content);
    }

    for value in &mut values {
        let trimmed = value.trim_matches(is_space);
        if trimmed.len() != value.len() {
            *value = trimmed.to_string();
        }
    }

    let record = ParsedRecord::from_values(values);
    tracing::debug!(
        filled = record.filled_count(),
        unrecognized = unrecognized_headers.len(),
        discarded_lines,
        "parsed model response"
    );

    ParseOutcome {
        record,
        unrecognized_headers,
        discarded_lines,
    }
}

/// Whitespace for trimming: Unicode `White_Space` plus U+001F (unit
/// separator), which model output sometimes carries around headings.
fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{1f}'
}

/// Remove a single leading `-` or `*` bullet and the whitespace after it.
fn strip_bullet(line: &str) -> &str {
    match line.strip_prefix(['-', '*']) {
        Some(rest) => rest.trim_start_matches(is_space),
        None => line,
    }
}

/// Split on every line boundary a model response may use, including lone
/// `\r` and the Unicode line/paragraph separators.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| {
        matches!(
            c,
            '\n' | '\r'
                | '\u{0b}'
                | '\u{0c}'
                | '\u{1c}'
                | '\u{1d}'
                | '\u{1e}'
                | '\u{85}'
                | '\u{2028}'
                | '\u{2029}'
        )
    })
}
