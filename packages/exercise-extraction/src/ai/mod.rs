//! Completion client implementations.
//!
//! Reference implementations of the `CompletionClient` trait. Users can use
//! these directly or implement their own.

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiCompatibleClient;
