//! Core trait abstractions for the exercise extraction library.
//!
//! Applications implement these to plug in the external services the
//! pipeline talks to.

pub mod completion;

pub use completion::{CompletionClient, CompletionRequest};
