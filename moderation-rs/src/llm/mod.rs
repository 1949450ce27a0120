//! LLM Engine abstraction
//!
//! The classifier only needs "prompt in, text out". Providers classify their
//! own failures into [`LlmError`] so callers never inspect error strings.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ClassifierConfig, Provider};
use crate::error::{ModerationError, Result};

pub mod gemini;
pub mod mock;
pub mod ollama;

/// Base delay of the transport retry backoff
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Longest single wait between transport retries
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Provider failure, already classified
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Provider answered HTTP 429
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Non-success HTTP status other than 429
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Connection, timeout or other transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider envelope could not be decoded
    #[error("could not decode provider response: {0}")]
    Decode(String),

    /// Provider returned no text
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    /// Build an error from a non-success HTTP status
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            LlmError::RateLimited(body)
        } else {
            LlmError::Status {
                status: status.as_u16(),
                body,
            }
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LlmError::RateLimited(_))
    }

    /// Whether the transport should retry on its own
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Transport(_) => true,
            LlmError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::Decode(err.to_string())
        } else {
            LlmError::Transport(err.to_string())
        }
    }
}

/// LLM Engine trait
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LlmEngine: Send + Sync {
    /// Send a single prompt and return the generated text
    async fn generate(&self, prompt: &str) -> std::result::Result<String, LlmError>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Build the engine selected by `config`
pub fn engine_from_config(config: &ClassifierConfig) -> Result<Arc<dyn LlmEngine>> {
    let llm: Arc<dyn LlmEngine> = match config.provider {
        Provider::Gemini => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| ModerationError::MissingApiKey("gemini".to_string()))?;

            let mut llm = gemini::GeminiLlm::new(config.model.clone(), api_key)
                .with_temperature(config.temperature)
                .with_max_retries(config.max_retries);
            if let Some(ref base_url) = config.base_url {
                llm = llm.with_base_url(base_url.clone());
            }
            Arc::new(llm)
        }
        Provider::Ollama => {
            let mut llm = ollama::OllamaLlm::new(config.model.clone())
                .with_temperature(config.temperature)
                .with_max_retries(config.max_retries);
            if let Some(ref base_url) = config.base_url {
                llm = llm.with_base_url(base_url.clone());
            }
            Arc::new(llm)
        }
        Provider::Mock => Arc::new(mock::MockLlm::new()),
    };

    info!("LLM initialized: {:?} ({})", config.provider, llm.model_name());
    Ok(llm)
}

/// Run `attempt` until it succeeds, fails with a non-transient error, or
/// `max_retries` retries have been spent. Backoff doubles from 500ms and is
/// capped at 30s.
pub(crate) async fn with_transport_retries<T, F, Fut>(
    max_retries: u32,
    mut attempt: F,
) -> std::result::Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, LlmError>>,
{
    let mut retries = 0;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && retries < max_retries => {
                let delay = retry_delay(retries);
                retries += 1;
                warn!(
                    "Transient provider error ({}), retry {}/{} in {:?}",
                    e, retries, max_retries, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                debug!("Provider error after {} retries: {}", retries, e);
                return Err(e);
            }
        }
    }
}

fn retry_delay(retries: u32) -> Duration {
    RETRY_BASE_DELAY
        .saturating_mul(2u32.saturating_pow(retries))
        .min(MAX_RETRY_DELAY)
}
