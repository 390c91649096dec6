//! Data types for the exercise extraction library.

pub mod candidate;
pub mod config;
pub mod record;
