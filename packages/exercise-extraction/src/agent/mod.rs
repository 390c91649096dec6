//! Agent extractor - exercise extraction through a language model.
//!
//! Sends the whole document with a fixed instruction, reads the reply
//! through the defensive [`ResponseParser`] chain and locates every
//! recovered entry in the source text. Failures never escape: a transport
//! error is logged and yields no candidates.

pub mod locate;
pub mod parse;
pub mod prompts;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::identifier::synthetic_identifier;
use crate::traits::completion::{CompletionClient, CompletionRequest};
use crate::types::candidate::ExerciseCandidate;
use crate::types::config::AgentConfig;

pub use locate::locate_span;
pub use parse::{
    repair_latex_escapes, FencedBlock, ParsedEntry, ParsedResponse, PatternScan, ResponseParser,
    ResponseStrategy, WholeBody,
};
pub use prompts::{format_user_prompt, EXTRACT_EXERCISES_PROMPT};

/// Extractor backed by a [`CompletionClient`].
pub struct AgentExtractor {
    client: Arc<dyn CompletionClient>,
    config: AgentConfig,
    parser: ResponseParser,
}

impl AgentExtractor {
    /// Create an extractor with the default [`AgentConfig`].
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self::with_config(client, AgentConfig::default())
    }

    pub fn with_config(client: Arc<dyn CompletionClient>, config: AgentConfig) -> Self {
        let parser = ResponseParser::new(&config);
        Self {
            client,
            config,
            parser,
        }
    }

    /// Build an extractor talking to an OpenAI-compatible endpoint configured
    /// from the environment.
    #[cfg(feature = "openai")]
    pub fn from_env() -> crate::error::Result<Self> {
        let client = crate::ai::OpenAiCompatibleClient::from_env()?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Replace the reply parser, e.g. to drop the pattern scan.
    pub fn with_parser(mut self, parser: ResponseParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// The request sent for `text`.
    pub fn request_for(&self, text: &str) -> CompletionRequest {
        CompletionRequest::new(EXTRACT_EXERCISES_PROMPT, format_user_prompt(text))
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
    }

    /// Ask the agent for candidates. Never fails; errors yield nothing.
    pub async fn extract(&self, text: &str) -> Vec<ExerciseCandidate> {
        let request = self.request_for(text);

        let reply = match self.client.complete(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Agent extraction failed");
                return Vec::new();
            }
        };

        let candidates = self.candidates_from_reply(&reply, text);
        info!(
            candidates = candidates.len(),
            reply_len = reply.len(),
            "Agent extraction complete"
        );
        candidates
    }

    /// Turn a raw reply into candidates located in `text`.
    pub fn candidates_from_reply(&self, reply: &str, text: &str) -> Vec<ExerciseCandidate> {
        let Some(parsed) = self.parser.parse(reply) else {
            warn!(reply_len = reply.len(), "Agent reply could not be parsed");
            return Vec::new();
        };

        parsed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let identifier = entry.id.unwrap_or_else(|| {
                    synthetic_identifier(if entry.title.is_empty() {
                        &entry.content
                    } else {
                        &entry.title
                    })
                });
                let span = locate_span(
                    &entry.content,
                    text,
                    self.config.locate_words,
                    self.config.span_padding,
                );
                if span.is_none() {
                    debug!(identifier = %identifier, "Agent entry not found in source");
                }

                ExerciseCandidate::new(identifier, entry.content, parsed.method.clone()).map(
                    |candidate| {
                        candidate
                            .with_title(entry.title)
                            .with_span(span)
                            .with_confidence(entry.confidence)
                    },
                )
            })
            .collect()
    }
}

impl std::fmt::Debug for AgentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentExtractor")
            .field("config", &self.config)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}
