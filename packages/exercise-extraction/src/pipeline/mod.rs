//! Extraction pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Pattern extraction over the fixed table
//! - Agent extraction, when an agent is attached and enabled
//! - Reconciliation into one record per exercise
//! - Page annotation from `--- PAGE n ---` markers

pub mod extract;
pub mod report;

pub use extract::ExercisePipeline;
pub use report::ExtractionReport;
