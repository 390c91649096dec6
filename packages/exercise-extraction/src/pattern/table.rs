//! The ordered table of structural exercise patterns.
//!
//! Order is priority: the most specific shapes come first and the most
//! permissive last. Later patterns deliberately re-match spans that earlier
//! ones already captured; the extractor keeps the first hit.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // Next LaTeX sectioning command (or the end of the document)
    static ref LATEX_BOUNDARY: Regex =
        Regex::new(r"\\(?:sub){0,2}section\b|\\end\{document\}").unwrap();

    // Next numbered item ("1.1.B.", "1.2.3.") or keyword header at a line start
    static ref TEXT_BOUNDARY: Regex = Regex::new(
        r"(?m)^[ \t]*(?:\d+\.[ \t]*\d+\.[ \t]*(?:\d+|[A-Z])\.|EXERCISE[ \t]+\d+\.\d+\.[A-Z]\b)"
    )
    .unwrap();

    static ref STRICT_LABEL: Regex = Regex::new(r"\d+\.\s*\d+\.\s*[A-Z]\b").unwrap();
    static ref LOOSE_LABEL: Regex = Regex::new(r"\d+\.\s*\d+\.\s*[A-Za-z]+").unwrap();

    /// All patterns, in priority order.
    pub static ref EXERCISE_PATTERNS: Vec<ExercisePattern> = vec![
        // \subsubsection*{1.1.C. EXERCISE.}
        ExercisePattern::new(
            "latex_numbered",
            r"(?i)\\subsubsection\*?\{\s*(?P<title>(?P<id>\d+\s*\.\s*\d+\s*\.\s*[A-Z])\s*\.\s*(?:UNIMPORTANT\s+|IMPORTANT\s+)?EXERCISE[^}]*)\}",
            Body::UntilBoundary(Boundary::Latex),
        ),
        // \begin{exercise}[title] ... \end{exercise}
        ExercisePattern::new(
            "latex_environment",
            r"(?s)\\begin\{exercise\}(?:\[(?P<title>[^\]]*)\])?(?P<content>.*?)\\end\{exercise\}",
            Body::Captured,
        ),
        // 1.1. A. UNIMPORTANT EXERCISE. <body>
        ExercisePattern::new(
            "text_numbered",
            r"\b(?P<id>\d+\.[ \t]*\d+\.[ \t]*[A-Z])\.[ \t]*(?P<title>(?:UNIMPORTANT[ \t]+|IMPORTANT[ \t]+)?EXERCISE)[ \t]*\.",
            Body::UntilBoundary(Boundary::Text),
        ),
        // EXERCISE 1.1.A <body>
        ExercisePattern::new(
            "text_keyword",
            r"\b(?P<title>EXERCISE[ \t]+(?P<id>\d+\.\d+\.[A-Z]))\b\.?",
            Body::UntilBoundary(Boundary::Text),
        ),
        // Any \subsubsection whose heading mentions an exercise
        ExercisePattern::new(
            "latex_general",
            r"(?i)\\subsubsection\*?\{(?P<title>[^}]*exercise[^}]*)\}",
            Body::UntilBoundary(Boundary::Latex),
        ),
        // A whole numbered block whose first line mentions an exercise
        ExercisePattern::new(
            "text_general",
            r"(?mi)^[ \t]*(?P<id>\d+\.[ \t]*\d+\.[ \t]*[A-Z])\.[ \t]*(?P<title>[^\n]*?\bexercise\b)",
            Body::BlockUntilBoundary(Boundary::Text),
        ),
    ];
}

/// Where a pattern's exercise body ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Latex,
    Text,
}

impl Boundary {
    fn regex(self) -> &'static Regex {
        match self {
            Boundary::Latex => &LATEX_BOUNDARY,
            Boundary::Text => &TEXT_BOUNDARY,
        }
    }
}

/// How the exercise body is taken from a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    /// The named `content` group
    Captured,

    /// From the end of the header up to the next boundary
    UntilBoundary(Boundary),

    /// Header included, up to the next boundary
    BlockUntilBoundary(Boundary),
}

/// A named structural pattern.
#[derive(Debug)]
pub struct ExercisePattern {
    name: &'static str,
    regex: Regex,
    body: Body,
}

/// Raw pieces of one pattern hit, borrowed from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'t> {
    /// Label captured by the pattern itself, if it has an `id` group
    pub id: Option<&'t str>,
    pub title: &'t str,
    pub content: &'t str,
    /// Text after the header; equals `content` unless the header is kept
    pub body: &'t str,
    /// Byte range of the whole hit, body included
    pub start: usize,
    pub end: usize,
}

impl ExercisePattern {
    fn new(name: &'static str, pattern: &str, body: Body) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).unwrap(),
            body,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// All hits of this pattern in `text`, in text order.
    pub fn find_matches<'t>(&self, text: &'t str) -> Vec<PatternMatch<'t>> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| self.to_match(text, &caps))
            .collect()
    }

    fn to_match<'t>(&self, text: &'t str, caps: &Captures<'t>) -> Option<PatternMatch<'t>> {
        let whole = caps.get(0)?;
        let title = caps.name("title").map(|m| m.as_str()).unwrap_or_default();
        let id = caps.name("id").map(|m| m.as_str());

        let (content, body, end) = match self.body {
            Body::Captured => {
                let content = caps.name("content")?.as_str();
                (content, content, whole.end())
            }
            Body::UntilBoundary(boundary) => {
                let end = body_end(text, whole.end(), boundary);
                let content = &text[whole.end()..end];
                (content, content, end)
            }
            Body::BlockUntilBoundary(boundary) => {
                let block_start = caps.name("id").map_or(whole.start(), |m| m.start());
                let end = body_end(text, whole.end(), boundary);
                (&text[block_start..end], &text[whole.end()..end], end)
            }
        };

        Some(PatternMatch {
            id,
            title,
            content,
            body,
            start: whole.start(),
            end,
        })
    }
}

fn body_end(text: &str, from: usize, boundary: Boundary) -> usize {
    boundary
        .regex()
        .find_at(text, from)
        .map_or(text.len(), |m| m.start())
}

/// Find an exercise label inside a heading: strict `1.1.A` first, then any
/// `1.1.<letters>`.
pub fn find_label(heading: &str) -> Option<&str> {
    STRICT_LABEL
        .find(heading)
        .or_else(|| LOOSE_LABEL.find(heading))
        .map(|m| m.as_str())
}
