//! Error types for moderation-rs
//!
//! Only startup paths (configuration, provider construction, serving) are
//! fallible. `Moderator::moderate` itself never returns an error.

use thiserror::Error;

/// Result type alias for moderation-rs operations
pub type Result<T> = std::result::Result<T, ModerationError>;

/// Moderation service error types
#[derive(Error, Debug)]
pub enum ModerationError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider needs an API key and none was configured
    #[error("Missing API key for provider '{0}'. Set GOOGLE_API_KEY or classifier.api_key")]
    MissingApiKey(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

impl From<::config::ConfigError> for ModerationError {
    fn from(err: ::config::ConfigError) -> Self {
        ModerationError::Config(err.to_string())
    }
}
