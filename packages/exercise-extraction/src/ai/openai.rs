//! OpenAI-compatible implementation of the completion trait.
//!
//! Speaks the `/chat/completions` protocol shared by OpenAI, Together and
//! most local gateways.
//!
//! # Example
//!
//! ```rust,ignore
//! use exercise_extraction::ai::OpenAiCompatibleClient;
//! use exercise_extraction::security::AICredentials;
//!
//! let credentials = AICredentials::new(key, "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo", "https://api.together.xyz/v1");
//! let agent = AgentExtractor::new(Arc::new(OpenAiCompatibleClient::new(credentials)));
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::security::credentials::AICredentials;
use crate::traits::completion::{CompletionClient, CompletionRequest};

/// Chat completion client for any OpenAI-compatible endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiCompatibleClient {
    client: Client,
    credentials: AICredentials,
}

impl OpenAiCompatibleClient {
    /// Create a client from explicit credentials.
    pub fn new(credentials: AICredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
        }
    }

    /// Create from `EXERCISE_AGENT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(AICredentials::from_env()?))
    }

    /// Use a preconfigured HTTP client (timeouts, proxies).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.credentials.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.credentials.base_url.trim_end_matches('/')
        )
    }

    fn chat_request(&self, request: &CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: self.credentials.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user.clone(),
                },
            ],
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(
            model = %self.credentials.model,
            prompt_len = request.user.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(
                "Authorization",
                format!("Bearer {}", self.credentials.api_key.expose()),
            )
            .header("Content-Type", "application/json")
            .json(&self.chat_request(request))
            .send()
            .await
            .map_err(|e| ExtractionError::AI(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::AI(Box::new(e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ExtractionError::EmptyCompletion)
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new(AICredentials::new(
            "sk-test",
            "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
            "https://api.together.xyz/v1/",
        ))
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(
            client().endpoint(),
            "https://api.together.xyz/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_request_shape() {
        let request = CompletionRequest::new("instructions", "document").with_max_tokens(100);
        let value = serde_json::to_value(client().chat_request(&request)).unwrap();

        assert_eq!(value["model"], "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][0]["content"], "instructions");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "document");
        assert_eq!(value["max_tokens"], 100);
        assert!(value["temperature"].as_f64().unwrap() < 0.2);
    }

    #[test]
    fn test_response_without_content() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
                .unwrap();
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("sk-test"));
    }
}
