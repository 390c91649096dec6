//! Exercise identifiers: normalization, parsing and ordering.
//!
//! Exercise labels arrive in many shapes (`"1.1. A."`, `" 1.1.A "`,
//! `"1.1.A"`). Everything that groups or sorts exercises goes through
//! [`normalize_identifier`] first, so the same exercise always lands under
//! the same key.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;

lazy_static! {
    // Whitespace around a separator, plus any run of repeated separators
    static ref SEPARATOR_RUN: Regex = Regex::new(r"\s*\.[\s.]*").unwrap();
}

const SYNTHETIC_PREFIX_CHARS: usize = 20;
const SYNTHETIC_FALLBACK: &str = "exercise";

/// Canonicalize a raw exercise label.
///
/// Trims the input, removes whitespace around `.` separators, collapses
/// repeated separators and strips one trailing separator. When the result
/// is not a recognizable label the trimmed input is returned unchanged so it
/// can still act as an exact-match grouping key.
///
/// ```
/// use exercise_extraction::normalize_identifier;
///
/// assert_eq!(normalize_identifier("1.1. A."), "1.1.A");
/// assert_eq!(normalize_identifier("  Groupoids  "), "Groupoids");
/// ```
pub fn normalize_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    let collapsed = SEPARATOR_RUN.replace_all(trimmed, ".");
    let canonical = collapsed.strip_suffix('.').unwrap_or(&*collapsed);

    if ExerciseId::parse(canonical).is_some() {
        canonical.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Total order over normalized identifiers.
///
/// Parsable labels sort by [`ExerciseId`] and come before anything
/// unparsable; unparsable identifiers compare as plain strings.
pub fn compare_identifiers(a: &str, b: &str) -> Ordering {
    match (ExerciseId::parse(a), ExerciseId::parse(b)) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Derive a stable identifier from free text when no label could be found.
///
/// Takes the first 20 characters, lowercases them, turns whitespace into
/// `_` and drops separators and punctuation.
pub fn synthetic_identifier(text: &str) -> String {
    let slug: String = text
        .trim()
        .chars()
        .take(SYNTHETIC_PREFIX_CHARS)
        .flat_map(char::to_lowercase)
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_alphanumeric() {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        SYNTHETIC_FALLBACK.to_string()
    } else {
        slug.to_string()
    }
}

/// One dot-separated piece of an exercise label.
///
/// Variant order matters: numbers sort before labels at the same position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    Number(u64),
    Label(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Number(n) => write!(f, "{}", n),
            Segment::Label(label) => f.write_str(label),
        }
    }
}

/// A parsed exercise label such as `1.1.A` (chapter 1, section 1, label A).
///
/// Ordering compares segments pairwise: numbers as integers, labels as
/// case-sensitive strings, and a shorter label before any extension of it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExerciseId {
    segments: Vec<Segment>,
}

impl ExerciseId {
    /// Parse a canonical label.
    ///
    /// Requires at least two segments, a numeric first segment, and segments
    /// made purely of ASCII digits or purely of ASCII letters.
    pub fn parse(canonical: &str) -> Option<Self> {
        let segments = canonical
            .split('.')
            .map(parse_segment)
            .collect::<Option<Vec<_>>>()?;

        match segments.first() {
            Some(Segment::Number(_)) if segments.len() >= 2 => Some(Self { segments }),
            _ => None,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Leading chapter number.
    pub fn chapter(&self) -> Option<u64> {
        match self.segments.first() {
            Some(Segment::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Section number, when the second segment is numeric.
    pub fn section(&self) -> Option<u64> {
        match self.segments.get(1) {
            Some(Segment::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Trailing letter label (the `A` in `1.1.A`).
    pub fn label(&self) -> Option<&str> {
        match self.segments.last() {
            Some(Segment::Label(label)) => Some(label.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

fn parse_segment(raw: &str) -> Option<Segment> {
    if raw.is_empty() {
        return None;
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        return raw.parse().ok().map(Segment::Number);
    }
    if raw.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Some(Segment::Label(raw.to_string()));
    }
    None
}
