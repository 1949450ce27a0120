//! LLM-backed message classifier
//!
//! Wraps an [`LlmEngine`] with the moderation prompt, strict response parsing,
//! and a single retry after a rate-limit cooldown. Every failure ends as the
//! [`ClassifierResult::error`] sentinel; nothing is raised to the caller.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::{ClassifierResult, ModerationLabel};
use crate::llm::{LlmEngine, LlmError};

const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(60);
const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// Why a classification attempt did not produce a result
#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum ClassifyFailure {
    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    #[error("malformed classifier response: {0}")]
    Malformed(String),

    #[error("classification exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl From<LlmError> for ClassifyFailure {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited(body) => ClassifyFailure::RateLimited(body),
            LlmError::Decode(msg) => ClassifyFailure::Malformed(msg),
            LlmError::EmptyResponse => {
                ClassifyFailure::Malformed(LlmError::EmptyResponse.to_string())
            }
            other => ClassifyFailure::Unavailable(other.to_string()),
        }
    }
}

/// Exactly the two fields the classifier must return
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClassification {
    label: String,
    confidence: f64,
}

/// Classifier client
pub struct ClassifierClient {
    llm: Arc<dyn LlmEngine>,
    rate_limit_cooldown: Duration,
    deadline: Option<Duration>,
}

impl ClassifierClient {
    /// Create a classifier over `llm` with a 60s rate-limit cooldown and a
    /// 120s overall deadline
    pub fn new(llm: Arc<dyn LlmEngine>) -> Self {
        Self {
            llm,
            rate_limit_cooldown: DEFAULT_RATE_LIMIT_COOLDOWN,
            deadline: Some(DEFAULT_DEADLINE),
        }
    }

    pub fn with_rate_limit_cooldown(mut self, cooldown: Duration) -> Self {
        self.rate_limit_cooldown = cooldown;
        self
    }

    /// `None` disables the overall deadline
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Classify a message. Failures yield the ERROR sentinel.
    pub async fn classify(&self, text: &str) -> ClassifierResult {
        let attempt = self.classify_with_retry(text);

        let outcome = match self.deadline {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .unwrap_or(Err(ClassifyFailure::DeadlineExceeded(limit))),
            None => attempt.await,
        };

        match outcome {
            Ok(result) => {
                debug!(
                    "Classifier {} -> {} ({:.2})",
                    self.llm.model_name(),
                    result.label,
                    result.confidence
                );
                result
            }
            Err(failure) => {
                warn!("Classification failed, moderation unavailable: {}", failure);
                ClassifierResult::error()
            }
        }
    }

    async fn classify_with_retry(&self, text: &str) -> Result<ClassifierResult, ClassifyFailure> {
        let prompt = build_prompt(text);

        match self.classify_once(&prompt).await {
            Err(ClassifyFailure::RateLimited(reason)) => {
                warn!(
                    "Classifier rate limited ({}), retrying once in {:?}",
                    reason, self.rate_limit_cooldown
                );
                tokio::time::sleep(self.rate_limit_cooldown).await;
                self.classify_once(&prompt).await
            }
            outcome => outcome,
        }
    }

    async fn classify_once(&self, prompt: &str) -> Result<ClassifierResult, ClassifyFailure> {
        let body = self.llm.generate(prompt).await?;
        parse_classification(&body)
    }
}

/// Build the moderation prompt for `text`
pub fn build_prompt(text: &str) -> String {
    let labels: Vec<&str> = ModerationLabel::CLASSIFIER_LABELS
        .iter()
        .map(ModerationLabel::as_str)
        .collect();

    format!(
        r#"You are a strict content moderation AI for an academic discussion platform.

Classify the message into exactly one of these labels:
{labels}

Message:
"""
{text}
"""

Return ONLY valid JSON with exactly these two fields and nothing else:
{{"label": "<one of the labels above>", "confidence": <number between 0 and 1>}}"#,
        labels = labels.join("\n"),
        text = text,
    )
}

/// Parse the classifier body into a result, rejecting any other shape
pub(crate) fn parse_classification(body: &str) -> Result<ClassifierResult, ClassifyFailure> {
    // models sometimes wrap JSON in a markdown code block
    let json = body
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let raw: RawClassification =
        serde_json::from_str(json).map_err(|e| ClassifyFailure::Malformed(e.to_string()))?;

    let label = ModerationLabel::from_classifier(&raw.label)
        .ok_or_else(|| ClassifyFailure::Malformed(format!("unknown label '{}'", raw.label)))?;

    if !(0.0..=1.0).contains(&raw.confidence) {
        return Err(ClassifyFailure::Malformed(format!(
            "confidence {} outside [0, 1]",
            raw.confidence
        )));
    }

    Ok(ClassifierResult {
        label,
        confidence: raw.confidence,
    })
}
