//! Google Gemini LLM implementation
//!
//! Talks to the `generateContent` REST endpoint.

use super::{with_transport_retries, LlmEngine, LlmError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini LLM implementation
pub struct GeminiLlm {
    model_name: String,
    api_key: String,
    base_url: String,
    temperature: f32,
    max_retries: u32,
    client: reqwest::Client,
}

impl GeminiLlm {
    pub fn new(model_name: String, api_key: String) -> Self {
        Self {
            model_name,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
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

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model_name)
    }

    async fn send_once(&self, request: &GenerateRequest<'_>) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("GeminiLLM: Request failed with status {}: {}", status, error_text);
            return Err(LlmError::from_status(status, error_text));
        }

        let response: GenerateResponse = response.json().await?;
        response.into_text()
    }
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Result<String, LlmError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(LlmError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

#[async_trait::async_trait]
impl LlmEngine for GeminiLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        debug!("GeminiLLM: Sending prompt to model {}", self.model_name);

        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
            },
        };

        let text = with_transport_retries(self.max_retries, || self.send_once(&request)).await?;

        debug!("GeminiLLM: Received {} bytes", text.len());
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
