//! Configuration types for the extractors and the pipeline.

use serde::{Deserialize, Serialize};

/// Configuration for the pattern extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Minimum cleaned content length, in characters.
    ///
    /// Shorter matches are treated as mis-fires on headers or stray
    /// numbers and discarded. Default: 10.
    pub min_content_len: usize,

    /// Number of leading content characters compared when deduplicating
    /// candidates whose identifiers could not be parsed.
    ///
    /// Default: 100.
    pub fingerprint_len: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_content_len: 10,
            fingerprint_len: 100,
        }
    }
}

impl PatternConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_content_len(mut self, len: usize) -> Self {
        self.min_content_len = len;
        self
    }

    pub fn with_fingerprint_len(mut self, len: usize) -> Self {
        self.fingerprint_len = len;
        self
    }
}

/// Request and parsing parameters for the agent extractor.
///
/// Credentials and the model live in
/// [`AICredentials`](crate::security::credentials::AICredentials); this
/// only shapes the request and how the reply is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Sampling temperature. Low values favor repeatable output.
    ///
    /// Default: 0.1.
    pub temperature: f32,

    /// Upper bound on the reply length. Default: 4000.
    pub max_tokens: u32,

    /// Confidence for structured entries that report none. Default: 0.8.
    pub default_confidence: f32,

    /// Confidence for entries recovered by pattern scanning. Default: 0.6.
    pub fallback_confidence: f32,

    /// Leading content words used to locate an entry in the source.
    ///
    /// Default: 10.
    pub locate_words: usize,

    /// Extra lines added past the content's own line count when estimating
    /// where a located entry ends. Default: 5.
    pub span_padding: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 4000,
            default_confidence: 0.8,
            fallback_confidence: 0.6,
            locate_words: 10,
            span_padding: 5,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_default_confidence(mut self, confidence: f32) -> Self {
        self.default_confidence = confidence;
        self
    }

    pub fn with_fallback_confidence(mut self, confidence: f32) -> Self {
        self.fallback_confidence = confidence;
        self
    }
}

/// Configuration for one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub patterns: PatternConfig,

    /// Consult the agent extractor, when one is attached.
    ///
    /// Default: true.
    pub use_agent: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            patterns: PatternConfig::default(),
            use_agent: true,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patterns(mut self, patterns: PatternConfig) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_agent(mut self, use_agent: bool) -> Self {
        self.use_agent = use_agent;
        self
    }
}
