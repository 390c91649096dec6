//! Per-call extraction summary.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::record::ExerciseRecord;

/// What one pipeline call found, and through which pathway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    /// Candidates the pattern extractor produced, after its own dedup
    pub pattern_candidates: usize,

    /// Candidates the agent produced (0 when skipped or failed)
    pub agent_candidates: usize,

    /// Whether the agent was consulted at all
    pub agent_used: bool,

    /// Final reconciled records
    pub records: Vec<ExerciseRecord>,
}

impl ExtractionReport {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Number of records won by each provenance tag.
    pub fn by_method(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.method.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct chapters covered, ascending.
    pub fn chapters(&self) -> Vec<u64> {
        let mut chapters: Vec<u64> = self.records.iter().filter_map(|r| r.chapter()).collect();
        chapters.sort_unstable();
        chapters.dedup();
        chapters
    }
}
