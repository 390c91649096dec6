//! Final, reconciled exercise records - the output of the pipeline.

use serde::Serialize;

use crate::identifier::ExerciseId;
use crate::text::{find_references, split_parts};
use crate::types::candidate::{ExerciseCandidate, ExtractionMethod, LineSpan};

/// One authoritative exercise per normalized identifier.
///
/// Holds exactly the winning candidate's fields; content from different
/// candidates is never combined. Serialization collaborators read the
/// fields by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseRecord {
    /// Normalized identifier, the grouping and sort key
    pub identifier: String,

    /// Identifier exactly as the winning extractor reported it
    pub raw_identifier: String,

    pub title: String,

    pub content: String,

    pub span: Option<LineSpan>,

    /// Provenance tag of the winning candidate
    pub method: ExtractionMethod,

    pub confidence: f32,

    /// Pages covered by `span`, recovered from page markers
    pub pages: Vec<u32>,
}

impl ExerciseRecord {
    /// Build a record from a reconciliation winner.
    pub fn from_candidate(identifier: String, candidate: ExerciseCandidate) -> Self {
        Self {
            identifier,
            raw_identifier: candidate.identifier,
            title: candidate.title,
            content: candidate.content,
            span: candidate.span,
            method: candidate.method,
            confidence: candidate.confidence,
            pages: Vec::new(),
        }
    }

    /// Parsed identifier, when it has the `chapter.section.label` shape.
    pub fn exercise_id(&self) -> Option<ExerciseId> {
        ExerciseId::parse(&self.identifier)
    }

    pub fn chapter(&self) -> Option<u64> {
        self.exercise_id().and_then(|id| id.chapter())
    }

    pub fn section(&self) -> Option<u64> {
        self.exercise_id().and_then(|id| id.section())
    }

    /// Lettered parts of a multi-part exercise.
    ///
    /// A single element when the exercise has no `(a)`, `(b)`, ... parts.
    pub fn parts(&self) -> Vec<String> {
        split_parts(&self.content)
    }

    /// Other exercises this one refers to.
    pub fn references(&self) -> Vec<String> {
        find_references(&self.content)
            .into_iter()
            .filter(|id| id != &self.identifier)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str) -> ExerciseRecord {
        let candidate = ExerciseCandidate::new(
            "1.2. B.",
            content,
            ExtractionMethod::pattern("text_numbered", 2),
        )
        .unwrap()
        .with_title("EXERCISE")
        .with_span(Some(LineSpan::new(3, 5)));
        ExerciseRecord::from_candidate("1.2.B".to_string(), candidate)
    }

    #[test]
    fn test_record_keeps_candidate_fields() {
        let record = record("Show that F is full.");
        assert_eq!(record.identifier, "1.2.B");
        assert_eq!(record.raw_identifier, "1.2. B.");
        assert_eq!(record.title, "EXERCISE");
        assert_eq!(record.span, Some(LineSpan::new(3, 5)));
        assert_eq!(record.confidence, 1.0);
        assert_eq!(record.chapter(), Some(1));
        assert_eq!(record.section(), Some(2));
    }

    #[test]
    fn test_record_parts_and_references() {
        let record = record("Using Exercise 1.2.B and Exercise 1.1.A: (a) show X. (b) show Y.");
        assert_eq!(record.parts().len(), 3);
        assert_eq!(record.references(), vec!["1.1.A"]);
    }

    #[test]
    fn test_record_serializes_field_names() {
        let value = serde_json::to_value(record("Show that F is full.")).unwrap();
        assert_eq!(value["identifier"], "1.2.B");
        assert_eq!(value["method"], "pattern:text_numbered");
        assert_eq!(value["span"]["start_line"], 3);
        assert!(value["pages"].as_array().unwrap().is_empty());
    }
}
