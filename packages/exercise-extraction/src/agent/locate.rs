//! Locating agent-reported exercises in the source text.

use crate::types::candidate::LineSpan;

/// Approximate the lines an agent-reported exercise occupies.
///
/// The first `words` words of `content`, lowercased and joined by single
/// spaces, are searched for in every lowercased line of `text`. The first
/// matching line starts the span; the end is estimated as the content's own
/// newline count plus `padding`, capped at the last line.
pub fn locate_span(content: &str, text: &str, words: usize, padding: usize) -> Option<LineSpan> {
    let phrase = content
        .split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if phrase.is_empty() || text.is_empty() {
        return None;
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let index = lines
        .iter()
        .position(|line| line.to_lowercase().contains(&phrase))?;

    let start = index + 1;
    let newlines = content.matches('\n').count();
    let end = (start + newlines + padding).min(lines.len());
    Some(LineSpan::new(start, end))
}
