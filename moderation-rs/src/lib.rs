//! moderation-rs: Text moderation engine
//!
//! Classifies a message as SAFE or unsafe by combining a deterministic
//! heuristic spam score with an external LLM classifier.
//!
//! # Decision policy
//!
//! - Heuristic score above 0.6: blocked as `SPAM`, source `rule_based`
//! - Otherwise the classifier label is used, blocking when the label is not
//!   `SAFE` and confidence is above 0.7, source `llm`
//! - If the classifier is unavailable the label is `ERROR` and the message is
//!   not blocked
//!
//! # Example
//!
//! ```no_run
//! use moderation_rs::llm::gemini::GeminiLlm;
//! use moderation_rs::Moderator;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let llm = GeminiLlm::new("gemini-2.5-flash".to_string(), "api-key".to_string());
//!     let moderator = Moderator::new(Arc::new(llm));
//!
//!     let verdict = moderator.moderate("When is the midterm?").await;
//!     println!("{:?} blocked={}", verdict.label, verdict.blocked);
//! }
//! ```
//!
//! # Modules
//!
//! - [`spam`]: heuristic scorer
//! - [`llm`]: LLM provider abstraction (Gemini, Ollama, mock)
//! - [`moderation`]: classifier client and decision combiner
//! - [`api`]: HTTP API
//! - [`config`]: configuration management
//! - [`error`]: error types

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod moderation;
pub mod spam;

// Re-export commonly used types
pub use config::ModerationConfig;
pub use error::{ModerationError, Result};
pub use moderation::{
    ClassifierResult, ModerationLabel, ModerationVerdict, Moderator, VerdictSource,
};
