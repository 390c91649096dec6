//! Secure handling of completion service credentials.

pub mod credentials;

pub use credentials::{AICredentials, SecretString};
