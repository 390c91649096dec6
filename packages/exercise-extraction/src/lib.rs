//! Exercise Extraction Library
//!
//! Finds the exercises in mathematical lecture notes (LaTeX source or text
//! recovered from PDFs) and returns one authoritative record per exercise.
//!
//! # Design
//!
//! Two independent extractors feed a reconciler:
//!
//! - The pattern extractor applies a fixed, ordered table of structural
//!   patterns. Deterministic, confidence 1.0.
//! - The agent extractor asks a language model for the same list and reads
//!   the untrusted reply defensively. Optional and fail-soft.
//!
//! Overlapping candidates are grouped by normalized identifier, the most
//! trustworthy one wins, and the result is sorted in document order
//! (`1.1.A < 1.1.B < 1.2.A < 1.10.A`).
//!
//! # Usage
//!
//! ```rust,ignore
//! use exercise_extraction::{AgentExtractor, ExercisePipeline, PipelineConfig};
//! use exercise_extraction::testing::MockCompletion;
//!
//! // Pattern-only
//! let pipeline = ExercisePipeline::new(PipelineConfig::default());
//! let records = pipeline.extract(&latex).await;
//!
//! // With an agent
//! let agent = AgentExtractor::new(Arc::new(MockCompletion::replying(reply)));
//! let pipeline = ExercisePipeline::new(PipelineConfig::default()).with_agent(agent);
//! let report = pipeline.extract_with_report(&latex).await;
//! ```
//!
//! # Modules
//!
//! - [`identifier`] - Normalization and ordering of exercise labels
//! - [`pattern`] - Rule-based extraction over the pattern table
//! - [`agent`] - Model-backed extraction and defensive reply parsing
//! - [`reconcile`] - Merging candidates into final records
//! - [`pipeline`] - End-to-end orchestration
//! - [`traits`] - The completion client abstraction
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod agent;
pub mod error;
pub mod identifier;
pub mod pages;
pub mod pattern;
pub mod pipeline;
pub mod reconcile;
pub mod security;
pub mod testing;
pub mod text;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{ExtractionError, Result};
pub use identifier::{compare_identifiers, normalize_identifier, ExerciseId};
pub use traits::{CompletionClient, CompletionRequest};
pub use types::{
    candidate::{ExerciseCandidate, ExtractionMethod, LineSpan},
    config::{AgentConfig, PatternConfig, PipelineConfig},
    record::ExerciseRecord,
};

pub use agent::AgentExtractor;
pub use pattern::PatternExtractor;
pub use pipeline::{ExercisePipeline, ExtractionReport};
pub use reconcile::Reconciler;
pub use security::AICredentials;

#[cfg(feature = "openai")]
pub use ai::OpenAiCompatibleClient;
