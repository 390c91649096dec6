//! Content utilities shared by the extractors and records.

use lazy_static::lazy_static;
use regex::Regex;

use crate::identifier::normalize_identifier;
use crate::pages::strip_page_markers;

lazy_static! {
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n[ \t]*(?:\r?\n[ \t]*)+").unwrap();
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();

    // "(a)" at the start of the text or after whitespace, so "f(x)" is left alone
    static ref PART_MARKER: Regex = Regex::new(r"(?:^|\s)\(([a-z])\)").unwrap();

    static ref EXERCISE_REFERENCE: Regex =
        Regex::new(r"(?i)\bexercises?\s+(\d+\s*\.\s*\d+\s*\.\s*[A-Z])\b").unwrap();
}

/// Clean extracted exercise text.
///
/// Page markers are removed and whitespace runs collapse to single spaces.
/// Paragraph breaks survive only in multi-part content, where they separate
/// the `(a)`, `(b)`, ... parts.
pub fn clean_content(raw: &str) -> String {
    let without_markers = strip_page_markers(raw);
    let normalized_newlines = without_markers.replace("\r\n", "\n");

    let paragraphs: Vec<String> = PARAGRAPH_BREAK
        .split(&normalized_newlines)
        .map(|p| WHITESPACE_RUN.replace_all(p.trim(), " ").into_owned())
        .filter(|p| !p.is_empty())
        .collect();

    let joined = paragraphs.join(" ");
    if is_multipart(&joined) {
        paragraphs.join("\n\n")
    } else {
        joined
    }
}

/// Whether the content has lettered parts starting at `(a)`.
pub fn is_multipart(content: &str) -> bool {
    part_starts(content).next().is_some()
}

/// Split content on sequential `(a)`, `(b)`, ... markers.
///
/// Text before the first marker is kept as its own leading part. Content
/// without markers comes back as a single part.
pub fn split_parts(content: &str) -> Vec<String> {
    let starts: Vec<usize> = part_starts(content).collect();
    if starts.is_empty() {
        return vec![content.trim().to_string()];
    }

    let mut parts = Vec::with_capacity(starts.len() + 1);
    let preamble = content[..starts[0]].trim();
    if !preamble.is_empty() {
        parts.push(preamble.to_string());
    }

    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(content.len());
        let part = content[start..end].trim();
        if !part.is_empty() {
            parts.push(part.to_string());
        }
    }

    parts
}

/// Byte offsets of the opening parenthesis of each sequential part marker.
fn part_starts(content: &str) -> impl Iterator<Item = usize> + '_ {
    let mut expected = b'a';
    PART_MARKER.captures_iter(content).filter_map(move |caps| {
        let letter = caps.get(1)?;
        if letter.as_str().as_bytes().first() != Some(&expected) {
            return None;
        }
        expected += 1;
        Some(letter.start() - 1)
    })
}

/// Identifiers of exercises referenced in the content ("see Exercise 1.1.B").
///
/// Normalized, deduplicated, in order of first appearance.
pub fn find_references(content: &str) -> Vec<String> {
    let mut references: Vec<String> = Vec::new();
    for caps in EXERCISE_REFERENCE.captures_iter(content) {
        let Some(id) = caps.get(1) else { continue };
        let normalized = normalize_identifier(id.as_str());
        if !references.contains(&normalized) {
            references.push(normalized);
        }
    }
    references
}

/// 1-based line number of a byte offset.
pub fn line_at(text: &str, offset: usize) -> usize {
    let offset = offset.min(text.len());
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}
