//! The exercise pipeline - main entry point of the library.

use tracing::{debug, info};

use crate::agent::AgentExtractor;
use crate::pages::PageIndex;
use crate::pattern::PatternExtractor;
use crate::pipeline::report::ExtractionReport;
use crate::reconcile::Reconciler;
use crate::types::config::PipelineConfig;
use crate::types::record::ExerciseRecord;

/// Pattern extraction, optional agent extraction, reconciliation.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = ExercisePipeline::new(PipelineConfig::default())
///     .with_agent(AgentExtractor::from_env()?);
///
/// let records = pipeline.extract(&latex).await;
/// ```
#[derive(Debug)]
pub struct ExercisePipeline {
    config: PipelineConfig,
    patterns: PatternExtractor,
    agent: Option<AgentExtractor>,
    reconciler: Reconciler,
}

impl ExercisePipeline {
    /// Create a pattern-only pipeline.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            patterns: PatternExtractor::new(config.patterns.clone()),
            config,
            agent: None,
            reconciler: Reconciler::new(),
        }
    }

    /// Attach an agent extractor.
    pub fn with_agent(mut self, agent: AgentExtractor) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    /// Extract the final, sorted exercise list. Never fails.
    pub async fn extract(&self, text: &str) -> Vec<ExerciseRecord> {
        self.extract_with_report(text).await.records
    }

    /// Extract, and report how many candidates each pathway produced.
    pub async fn extract_with_report(&self, text: &str) -> ExtractionReport {
        let pattern = self.patterns.extract(text);

        let agent = match &self.agent {
            Some(agent) if self.config.use_agent => Some(agent.extract(text).await),
            _ => None,
        };
        let agent_used = agent.is_some();
        let agent = agent.unwrap_or_default();

        let pattern_candidates = pattern.len();
        let agent_candidates = agent.len();

        let mut records = self.reconciler.reconcile(pattern, agent);
        annotate_pages(&mut records, text);

        info!(
            pattern_candidates,
            agent_candidates,
            agent_used,
            records = records.len(),
            "Exercise extraction complete"
        );

        ExtractionReport {
            pattern_candidates,
            agent_candidates,
            agent_used,
            records,
        }
    }
}

/// Fill `pages` from the page markers in `text`, when there are any.
fn annotate_pages(records: &mut [ExerciseRecord], text: &str) {
    let index = PageIndex::build(text);
    if index.is_empty() {
        return;
    }

    for record in records.iter_mut() {
        if let Some(span) = record.span {
            record.pages = index.pages_for(span);
        }
    }
    debug!(records = records.len(), "Annotated page numbers");
}
