//! Pattern extractor - rule-based exercise extraction.
//!
//! Applies the ordered [`EXERCISE_PATTERNS`] table to the full text. Every
//! candidate gets confidence 1.0 and a `pattern:<name>` provenance tag.
//! Overlapping hits are resolved here, before candidates leave the
//! extractor, by keeping the hit from the highest-priority pattern.

pub mod table;

use std::collections::HashSet;
use tracing::{debug, trace};

use crate::identifier::{normalize_identifier, synthetic_identifier, ExerciseId};
use crate::pages::trim_trailing_markers;
use crate::text::{clean_content, line_at};
use crate::types::candidate::{ExerciseCandidate, ExtractionMethod, LineSpan};
use crate::types::config::PatternConfig;

pub use table::{find_label, ExercisePattern, PatternMatch, EXERCISE_PATTERNS};

/// Rule-based extractor over the fixed pattern table.
#[derive(Debug, Clone, Default)]
pub struct PatternExtractor {
    config: PatternConfig,
}

impl PatternExtractor {
    pub fn new(config: PatternConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Extract deduplicated candidates, in pattern-priority order.
    pub fn extract(&self, text: &str) -> Vec<ExerciseCandidate> {
        let mut candidates = Vec::new();

        for (priority, pattern) in EXERCISE_PATTERNS.iter().enumerate() {
            let hits = pattern.find_matches(text);
            trace!(pattern = pattern.name(), hits = hits.len(), "Pattern applied");

            candidates.extend(
                hits.into_iter()
                    .filter_map(|hit| self.to_candidate(text, pattern.name(), priority, hit)),
            );
        }

        let total = candidates.len();
        let unique = deduplicate(candidates, self.config.fingerprint_len);
        debug!(
            candidates = total,
            unique = unique.len(),
            "Pattern extraction complete"
        );
        unique
    }

    fn to_candidate(
        &self,
        text: &str,
        name: &str,
        priority: usize,
        hit: PatternMatch<'_>,
    ) -> Option<ExerciseCandidate> {
        // Headers kept in the content do not count towards the minimum length
        let body_len = clean_content(hit.body.trim_start_matches(['.', ':']))
            .chars()
            .count();
        if body_len < self.config.min_content_len {
            trace!(pattern = name, body_len, "Discarding short match");
            return None;
        }

        let content = clean_content(hit.content);

        let title = clean_content(hit.title);
        let identifier = hit
            .id
            .or_else(|| find_label(hit.title))
            .map(str::to_string)
            .unwrap_or_else(|| {
                synthetic_identifier(if title.is_empty() { &content } else { &title })
            });

        // Bodies run up to the next header; trailing blank lines and page
        // markers are not part of the span
        let end = hit.start + trim_trailing_markers(&text[hit.start..hit.end]).len();
        let span = LineSpan::new(line_at(text, hit.start), line_at(text, end));

        ExerciseCandidate::new(identifier, content, ExtractionMethod::pattern(name, priority))
            .map(|candidate| candidate.with_title(title).with_span(Some(span)))
    }
}

/// Keep the first of every group of duplicates.
///
/// Duplicates share a normalized identifier, or, when either identifier is
/// unparsable, share the first `fingerprint_len` characters of content.
fn deduplicate(candidates: Vec<ExerciseCandidate>, fingerprint_len: usize) -> Vec<ExerciseCandidate> {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_fingerprints: HashSet<String> = HashSet::new();
    let mut unparsed_fingerprints: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let normalized = normalize_identifier(&candidate.identifier);
        let parsed = ExerciseId::parse(&normalized).is_some();
        let fingerprint: String = candidate.content.chars().take(fingerprint_len).collect();

        let duplicate = seen_ids.contains(&normalized)
            || if parsed {
                unparsed_fingerprints.contains(&fingerprint)
            } else {
                seen_fingerprints.contains(&fingerprint)
            };

        if duplicate {
            trace!(
                identifier = %normalized,
                method = %candidate.method,
                "Dropping duplicate match"
            );
            continue;
        }

        if !parsed {
            unparsed_fingerprints.insert(fingerprint.clone());
        }
        seen_fingerprints.insert(fingerprint);
        seen_ids.insert(normalized);
        unique.push(candidate);
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Vec<ExerciseCandidate> {
        PatternExtractor::default().extract(text)
    }

    #[test]
    fn test_specific_pattern_wins_overlap() {
        let candidates = extract("1.1.A. EXERCISE. Show that F is full.");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "1.1.A");
        assert_eq!(candidates[0].content, "Show that F is full.");
        assert_eq!(candidates[0].method.to_string(), "pattern:text_numbered");
        assert_eq!(candidates[0].confidence, 1.0);
        assert_eq!(candidates[0].span, Some(LineSpan::new(1, 1)));
    }

    #[test]
    fn test_latex_document() {
        let text = r"\section{Categories}
\subsubsection*{1.1.A. Unimportant Exercise}
A category in which each morphism is an isomorphism is called a groupoid.
Describe a groupoid with one object.
\subsubsection*{1.1.B. EXERCISE.}
Show that the composition of two isomorphisms is an isomorphism.
\subsubsection*{A harder exercise}
Show that a groupoid with one object is a group.
\subsection{Functors}
Some prose.
";
        let candidates = extract(text);
        let ids: Vec<_> = candidates.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(ids, vec!["1.1.A", "1.1.B", "a_harder_exercise"]);

        let a = &candidates[0];
        assert_eq!(a.method.to_string(), "pattern:latex_numbered");
        assert_eq!(a.title, "1.1.A. Unimportant Exercise");
        assert_eq!(
            a.content,
            "A category in which each morphism is an isomorphism is called a groupoid. \
             Describe a groupoid with one object."
        );
        assert_eq!(a.span, Some(LineSpan::new(2, 4)));

        let b = &candidates[1];
        assert_eq!(b.method.to_string(), "pattern:latex_numbered");
        assert_eq!(b.span, Some(LineSpan::new(5, 6)));

        let general = &candidates[2];
        assert_eq!(general.method.to_string(), "pattern:latex_general");
        assert_eq!(general.content, "Show that a groupoid with one object is a group.");
    }

    #[test]
    fn test_short_matches_are_discarded() {
        let candidates = extract("EXERCISE 1.1.A Hi.\n");
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_short_body_discarded_by_every_pattern() {
        // text_general keeps the header in its content; only the body counts
        assert!(extract("1.1.A. EXERCISE. Hi.").is_empty());
        assert!(extract("1.1.A. Exercise.\nHi.").is_empty());
    }

    #[test]
    fn test_min_content_len_is_configurable() {
        let extractor = PatternExtractor::new(PatternConfig::new().with_min_content_len(1));
        let candidates = extractor.extract("EXERCISE 1.1.A Hi.\n");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].method.to_string(), "pattern:text_keyword");
    }

    #[test]
    fn test_unlabelled_environment_gets_synthetic_id() {
        let text = "\\begin{exercise}\nShow that every groupoid is a category.\n\\end{exercise}";
        let candidates = extract(text);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "show_that_every_grou");
        assert_eq!(candidates[0].method.to_string(), "pattern:latex_environment");
    }

    #[test]
    fn test_no_matches_is_empty() {
        assert!(extract("Nothing to see here.").is_empty());
        assert!(extract("").is_empty());
    }

    #[test]
    fn test_dedup_by_fingerprint_when_unparsed() {
        let content = "Show that every groupoid is a category.";
        let candidate = |id: &str, name: &str, priority| {
            ExerciseCandidate::new(id, content, ExtractionMethod::pattern(name, priority)).unwrap()
        };
        let first = candidate("1.1.A", "a", 0);
        let second = candidate("groupoids", "b", 1);
        let third = candidate("1.1.B", "c", 2);

        let unique = deduplicate(vec![first, second, third], 100);
        let ids: Vec<_> = unique.iter().map(|c| c.identifier.as_str()).collect();
        // Two parsed labels with equal content stay distinct
        assert_eq!(ids, vec!["1.1.A", "1.1.B"]);
    }

    #[test]
    fn test_dedup_by_normalized_id() {
        let first =
            ExerciseCandidate::new("1.1. A.", "First body text", ExtractionMethod::pattern("a", 0)).unwrap();
        let second =
            ExerciseCandidate::new("1.1.A", "Other body text", ExtractionMethod::pattern("b", 1)).unwrap();

        let unique = deduplicate(vec![first, second], 100);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].content, "First body text");
    }
}
