//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the exercise
//! extraction library without making real completion calls.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use crate::error::{ExtractionError, Result};
use crate::traits::completion::{CompletionClient, CompletionRequest};

/// Reply used when nothing was scripted.
pub const EMPTY_REPLY: &str = r#"{"exercises": []}"#;

/// A scripted outcome for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    Text(String),
    Failure(String),
}

/// A mock completion client for testing.
///
/// Scripted outcomes are consumed in order, one per call. Once the script
/// runs out, every call gets the fallback outcome (by default an empty
/// exercise list). All requests are recorded for assertions.
#[derive(Clone)]
pub struct MockCompletion {
    /// Outcomes for the next calls, in order
    script: Arc<RwLock<VecDeque<MockReply>>>,

    /// Outcome once the script is exhausted
    fallback: MockReply,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<CompletionRequest>>>,
}

impl MockCompletion {
    /// Create a mock that answers every call with an empty exercise list.
    pub fn new() -> Self {
        Self {
            script: Arc::default(),
            fallback: MockReply::Text(EMPTY_REPLY.to_string()),
            calls: Arc::default(),
        }
    }

    /// Answer every call with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            fallback: MockReply::Text(reply.into()),
            ..Self::new()
        }
    }

    /// Fail every call with an AI error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fallback: MockReply::Failure(message.into()),
            ..Self::new()
        }
    }

    /// Queue a reply for the next unscripted call.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.script
            .write()
            .unwrap()
            .push_back(MockReply::Text(reply.into()));
        self
    }

    /// Queue a failure for the next unscripted call.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.script
            .write()
            .unwrap()
            .push_back(MockReply::Failure(message.into()));
        self
    }

    /// Get all requests made to this mock.
    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.calls.write().unwrap().push(request.clone());

        let outcome = self
            .script
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match outcome {
            MockReply::Text(reply) => Ok(reply),
            MockReply::Failure(message) => Err(ExtractionError::AI(message.into())),
        }
    }
}
