//! Reconciliation - one record per exercise out of overlapping candidates.
//!
//! Candidates are bucketed by normalized identifier in arrival order
//! (pattern candidates first, then agent candidates). Each bucket keeps a
//! single winner, chosen by:
//!
//! 1. higher confidence
//! 2. lower [`ExtractionMethod::trust_rank`]: patterns over the agent, more
//!    specific patterns over general ones, structured agent replies over
//!    scanned ones
//! 3. earlier arrival
//!
//! Winners are emitted in [`compare_identifiers`] order. Fields are never
//! merged across candidates.
//!
//! [`ExtractionMethod::trust_rank`]: crate::types::candidate::ExtractionMethod::trust_rank

use indexmap::map::Entry;
use indexmap::IndexMap;
use std::cmp::Ordering;
use tracing::{debug, trace};

use crate::identifier::{compare_identifiers, normalize_identifier};
use crate::types::candidate::ExerciseCandidate;
use crate::types::record::ExerciseRecord;

/// Merges pattern and agent candidates into the final record list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Self
    }

    /// Reconcile both candidate lists into sorted, unique records.
    pub fn reconcile(
        &self,
        pattern: Vec<ExerciseCandidate>,
        agent: Vec<ExerciseCandidate>,
    ) -> Vec<ExerciseRecord> {
        let total = pattern.len() + agent.len();
        let mut buckets: IndexMap<String, ExerciseCandidate> = IndexMap::with_capacity(total);

        for candidate in pattern.into_iter().chain(agent) {
            let identifier = normalize_identifier(&candidate.identifier);

            match buckets.entry(identifier) {
                Entry::Vacant(slot) => {
                    slot.insert(candidate);
                }
                Entry::Occupied(mut slot) => {
                    if selection_order(&candidate, slot.get()) == Ordering::Less {
                        trace!(
                            identifier = %slot.key(),
                            winner = %candidate.method,
                            loser = %slot.get().method,
                            "Replacing candidate"
                        );
                        slot.insert(candidate);
                    }
                }
            }
        }

        let mut records: Vec<ExerciseRecord> = buckets
            .into_iter()
            .map(|(identifier, winner)| ExerciseRecord::from_candidate(identifier, winner))
            .collect();
        records.sort_by(|a, b| compare_identifiers(&a.identifier, &b.identifier));

        debug!(
            candidates = total,
            records = records.len(),
            "Reconciliation complete"
        );
        records
    }
}

/// `Less` when `a` should be preferred over `b`.
///
/// Ties compare `Equal`; the caller keeps the earlier arrival.
fn selection_order(a: &ExerciseCandidate, b: &ExerciseCandidate) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| a.method.trust_rank().cmp(&b.method.trust_rank()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::candidate::ExtractionMethod;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn pattern(id: &str, content: &str, priority: usize) -> ExerciseCandidate {
        ExerciseCandidate::new(id, content, ExtractionMethod::pattern(format!("p{}", priority), priority))
            .unwrap()
    }

    fn agent(id: &str, content: &str, confidence: f32) -> ExerciseCandidate {
        ExerciseCandidate::new(id, content, ExtractionMethod::AgentStructured)
            .unwrap()
            .with_confidence(confidence)
    }

    fn reconcile(
        pattern: Vec<ExerciseCandidate>,
        agent: Vec<ExerciseCandidate>,
    ) -> Vec<ExerciseRecord> {
        Reconciler::new().reconcile(pattern, agent)
    }

    #[test]
    fn test_ordering_law() {
        let candidates = ["1.2.A", "1.1.B", "1.1.A", "1.10.A"]
            .iter()
            .map(|id| pattern(id, "Some body text.", 0))
            .collect();
        let ids: Vec<_> = reconcile(candidates, vec![])
            .into_iter()
            .map(|r| r.identifier)
            .collect();
        assert_eq!(ids, vec!["1.1.A", "1.1.B", "1.2.A", "1.10.A"]);
    }

    #[test]
    fn test_higher_confidence_wins_regardless_of_order() {
        let strong = pattern("1.1.A", "from pattern", 3);
        let weak = agent("1.1.A", "from agent", 0.9);

        let records = reconcile(vec![strong.clone()], vec![weak.clone()]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "from pattern");

        let records = reconcile(vec![], vec![weak, strong]);
        assert_eq!(records[0].content, "from pattern");
    }

    #[test]
    fn test_pattern_priority_breaks_ties() {
        let general = pattern("1.1.A", "general", 5);
        let specific = pattern("1.1. A.", "specific", 2);

        let records = reconcile(vec![general, specific], vec![]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].identifier, "1.1.A");
        assert_eq!(records[0].raw_identifier, "1.1. A.");
        assert_eq!(records[0].content, "specific");
        assert_eq!(records[0].method.to_string(), "pattern:p2");
    }

    #[test]
    fn test_pattern_beats_equally_confident_agent() {
        let records = reconcile(
            vec![pattern("1.1.A", "pattern body", 4)],
            vec![agent("1.1.A", "agent body", 1.0)],
        );
        assert_eq!(records[0].content, "pattern body");
    }

    #[test]
    fn test_structured_beats_fallback_then_arrival() {
        let fallback = ExerciseCandidate::new("1.1.A", "fallback", ExtractionMethod::AgentFallback)
            .unwrap()
            .with_confidence(0.7);
        let structured = agent("1.1.A", "structured", 0.7);
        let records = reconcile(vec![], vec![fallback, structured]);
        assert_eq!(records[0].content, "structured");

        let first = agent("1.1.B", "first", 0.7);
        let second = agent("1.1.B", "second", 0.7);
        let records = reconcile(vec![], vec![first, second]);
        assert_eq!(records[0].content, "first");
    }

    #[test]
    fn test_agent_fills_gaps() {
        let records = reconcile(
            vec![pattern("1.1.A", "pattern body", 0)],
            vec![agent("1.1.B", "agent body", 0.95)],
        );
        let tags: Vec<_> = records.iter().map(|r| r.method.to_string()).collect();
        assert_eq!(tags, vec!["pattern:p0", "agent:structured"]);
        assert_eq!(records[1].confidence, 0.95);
    }

    #[test]
    fn test_empty_input() {
        assert!(reconcile(vec![], vec![]).is_empty());
    }

    fn arb_candidate() -> impl Strategy<Value = ExerciseCandidate> {
        (
            prop_oneof![
                Just("1.1.A"),
                Just("1.1. A."),
                Just("1.1.B"),
                Just("1.2.A"),
                Just("1.10.A"),
                Just("groupoids"),
            ],
            0usize..6,
            0.0f32..=1.0,
            any::<bool>(),
        )
            .prop_map(|(id, priority, confidence, is_agent)| {
                if is_agent {
                    agent(id, "agent body", confidence)
                } else {
                    pattern(id, "pattern body", priority)
                }
            })
    }

    proptest! {
        #[test]
        fn prop_no_duplicate_identifiers(
            pattern in prop::collection::vec(arb_candidate(), 0..12),
            agent in prop::collection::vec(arb_candidate(), 0..12),
        ) {
            let records = reconcile(pattern, agent);
            let ids: HashSet<_> = records.iter().map(|r| r.identifier.clone()).collect();
            prop_assert_eq!(ids.len(), records.len());
        }

        #[test]
        fn prop_winner_has_max_confidence(
            candidates in prop::collection::vec(arb_candidate(), 1..12),
        ) {
            let records = reconcile(candidates.clone(), vec![]);
            for record in &records {
                let best = candidates
                    .iter()
                    .filter(|c| normalize_identifier(&c.identifier) == record.identifier)
                    .map(|c| c.confidence)
                    .fold(f32::MIN, f32::max);
                prop_assert_eq!(record.confidence, best);
            }
        }

        #[test]
        fn prop_output_is_sorted(
            candidates in prop::collection::vec(arb_candidate(), 0..12),
        ) {
            let records = reconcile(candidates, vec![]);
            for pair in records.windows(2) {
                prop_assert_ne!(
                    compare_identifiers(&pair[0].identifier, &pair[1].identifier),
                    Ordering::Greater
                );
            }
        }
    }
}
