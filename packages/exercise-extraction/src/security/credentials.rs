//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of sensitive values.
//! Credentials are always injected; nothing here carries a built-in key.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

use crate::error::{ExtractionError, Result};

/// A secret string that won't be logged or displayed.
///
/// Uses `secrecy::SecretBox` to ensure API keys and other credentials
/// are never accidentally exposed in logs, debug output, or error messages.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Environment variable holding the completion service API key.
pub const API_KEY_VAR: &str = "EXERCISE_AGENT_API_KEY";

/// Environment variable naming the model.
pub const MODEL_VAR: &str = "EXERCISE_AGENT_MODEL";

/// Environment variable holding the OpenAI-compatible base URL.
pub const BASE_URL_VAR: &str = "EXERCISE_AGENT_BASE_URL";

/// Everything needed to reach a completion service.
///
/// There are no built-in defaults: the key, the model and the endpoint are
/// always supplied by the caller or the environment.
#[derive(Clone)]
pub struct AICredentials {
    /// API key (secret)
    pub api_key: SecretString,

    /// Model identifier
    pub model: String,

    /// API base URL, e.g. `https://api.together.xyz/v1`
    pub base_url: String,
}

impl AICredentials {
    /// Create new AI credentials.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: SecretString::new(api_key),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    /// Read credentials from the environment, loading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ExtractionError::Config(format!("{} not set", name).into()))
        };

        Ok(Self::new(
            require(API_KEY_VAR)?,
            require(MODEL_VAR)?,
            require(BASE_URL_VAR)?,
        ))
    }
}

impl fmt::Debug for AICredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AICredentials")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
