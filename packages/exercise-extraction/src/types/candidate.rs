//! Candidate types - provisional extractions before reconciliation.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Which pathway produced a candidate.
///
/// Rendered as a provenance tag: `pattern:<name>`, `agent:structured` or
/// `agent:fallback`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExtractionMethod {
    /// A structural pattern. Lower `priority` means a more specific pattern
    /// that was tried earlier.
    Pattern { name: String, priority: usize },

    /// The agent reply decoded as structured data
    AgentStructured,

    /// The agent reply was scanned with permissive patterns
    AgentFallback,
}

impl ExtractionMethod {
    /// Create a pattern method tag.
    pub fn pattern(name: impl Into<String>, priority: usize) -> Self {
        Self::Pattern {
            name: name.into(),
            priority,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }

    pub fn is_agent(&self) -> bool {
        !self.is_pattern()
    }

    /// Trust rank among equally confident candidates (lower is trusted more).
    ///
    /// Rule-based extraction outranks the agent; among patterns the more
    /// specific one wins; among agent pathways structured beats fallback.
    pub fn trust_rank(&self) -> (u8, usize) {
        match self {
            Self::Pattern { priority, .. } => (0, *priority),
            Self::AgentStructured => (1, 0),
            Self::AgentFallback => (1, 1),
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern { name, .. } => write!(f, "pattern:{}", name),
            Self::AgentStructured => f.write_str("agent:structured"),
            Self::AgentFallback => f.write_str("agent:fallback"),
        }
    }
}

impl Serialize for ExtractionMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 1-based, inclusive line range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start_line: usize,
    pub end_line: usize,
}

impl LineSpan {
    pub fn new(start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            end_line: end_line.max(start_line),
        }
    }
}

/// A provisional exercise produced by one extractor.
///
/// Created fresh per extraction call and consumed by the reconciler in the
/// same call. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseCandidate {
    /// Raw label as found (e.g. "1.1. A."); normalized later
    pub(crate) identifier: String,

    /// Short heading, possibly empty
    pub(crate) title: String,

    /// Exercise body, never empty
    pub(crate) content: String,

    /// Where the exercise sits in the source, when known
    pub(crate) span: Option<LineSpan>,

    /// Provenance
    pub(crate) method: ExtractionMethod,

    /// Confidence in [0.0, 1.0]
    pub(crate) confidence: f32,
}

impl ExerciseCandidate {
    /// Create a candidate with full confidence, no title and no span.
    ///
    /// Returns `None` when `content` is blank.
    pub fn new(
        identifier: impl Into<String>,
        content: impl Into<String>,
        method: ExtractionMethod,
    ) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            return None;
        }

        Some(Self {
            identifier: identifier.into(),
            title: String::new(),
            content,
            span: None,
            method,
            confidence: 1.0,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn span(&self) -> Option<LineSpan> {
        self.span
    }

    pub fn method(&self) -> &ExtractionMethod {
        &self.method
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_span(mut self, span: Option<LineSpan>) -> Self {
        self.span = span;
        self
    }

    /// Set the confidence, clamped into [0.0, 1.0].
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = clamp_confidence(confidence, self.confidence);
        self
    }
}

/// Clamp a reported confidence into [0.0, 1.0], using `default` for NaN.
pub fn clamp_confidence(value: f32, default: f32) -> f32 {
    if value.is_nan() {
        default.clamp(0.0, 1.0)
    } else {
        value.clamp(0.0, 1.0)
    }
}
