//! Typed errors for the exercise extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Only the completion transport and configuration loading can fail.
//! The extraction pipeline itself never returns an error: malformed agent
//! replies and transport failures degrade to fewer candidates.

use thiserror::Error;

/// Errors raised at the boundary with the external completion service.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Completion service unavailable or failed
    #[error("AI service error: {0}")]
    AI(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Completion service answered with a non-success status
    #[error("AI service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Completion service answered without any choices
    #[error("AI service returned no completion")]
    EmptyCompletion,

    /// Configuration error (missing credentials, invalid settings)
    #[error("config error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
