//! Ollama LLM implementation
//!
//! This implementation uses Ollama's `/api/generate` endpoint in JSON mode.

use super::{with_transport_retries, LlmEngine, LlmError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ollama LLM implementation
pub struct OllamaLlm {
    model_name: String,
    base_url: String,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl OllamaLlm {
    pub fn new(model_name: String) -> Self {
        Self {
            model_name,
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.1,
            max_retries: 3,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    async fn send_once(&self, request: &OllamaGenerateRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("OllamaLLM: Request failed with status {}: {}", status, error_text);
            return Err(LlmError::from_status(status, error_text));
        }

        let ollama_response: OllamaGenerateResponse = response.json().await?;
        debug!("OllamaLLM: Received response, done={}", ollama_response.done);

        if ollama_response.response.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(ollama_response.response)
    }
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama generate response
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

#[async_trait::async_trait]
impl LlmEngine for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("OllamaLLM: Sending request to {}/api/generate", self.base_url);

        let request = OllamaGenerateRequest {
            model: &self.model_name,
            prompt,
            format: "json",
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        with_transport_retries(self.max_retries, || self.send_once(&request)).await
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
