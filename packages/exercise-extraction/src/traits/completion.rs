//! Completion trait for the agent extractor.
//!
//! The agent extractor only needs one capability from a language model:
//! answer a system instruction plus a user message with free text. Provider
//! specifics (endpoints, auth, retries) live behind this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One chat-style completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Fixed instruction describing the task and the reply schema
    pub system: String,

    /// The document to work on
    pub user: String,

    pub temperature: f32,

    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.1,
            max_tokens: 4000,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A language model reachable over some transport.
///
/// Replies are untrusted text. Implementations return an error only for
/// transport or service failures, never for the shape of the reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete one request and return the raw reply text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for std::sync::Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request).await
    }
}
