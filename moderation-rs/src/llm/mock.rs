//! Mock LLM for testing and offline development
//!
//! Two modes: a keyword lexicon that answers with classifier-shaped JSON, and
//! a scripted queue of canned results consumed one per call.

use super::{LlmEngine, LlmError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Keyword lexicon: (needle, label, confidence)
const LEXICON: &[(&str, &str, f64)] = &[
    ("kill you", "VIOLENCE", 0.95),
    ("beat you up", "VIOLENCE", 0.9),
    ("idiot", "HARASSMENT", 0.88),
    ("loser", "HARASSMENT", 0.8),
    ("i hate all", "HATE_SPEECH", 0.9),
    ("nsfw", "SEXUAL", 0.85),
    ("buy now", "SPAM", 0.8),
    ("free money", "SPAM", 0.85),
];

/// Mock LLM implementation for testing
pub struct MockLlm {
    model_name: String,
    script: Option<Mutex<VecDeque<Result<String, LlmError>>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockLlm {
    /// Keyword-driven mock
    pub fn new() -> Self {
        Self {
            model_name: "mock-llm-v1".to_string(),
            script: None,
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock that replays `responses` in order, repeating the last one once the
    /// script runs out. An empty script fails every call with a transport error.
    pub fn scripted(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Some(Mutex::new(responses.into())),
            ..Self::new()
        }
    }

    /// Mock that always answers with the given label and confidence
    pub fn replying(label: &str, confidence: f64) -> Self {
        Self::scripted(vec![Ok(classification_json(label, confidence))])
    }

    /// Number of `generate` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn classify_keywords(prompt: &str) -> String {
        let lowered = prompt.to_lowercase();

        for (needle, label, confidence) in LEXICON {
            if lowered.contains(needle) {
                debug!("MockLLM: Matched '{}' -> {}", needle, label);
                return classification_json(label, *confidence);
            }
        }

        classification_json("SAFE", 0.97)
    }

    fn next_scripted(script: &Mutex<VecDeque<Result<String, LlmError>>>) -> Result<String, LlmError> {
        let mut queue = script.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        match queue.len() {
            0 => Err(LlmError::Transport("mock script exhausted".to_string())),
            // the last entry repeats forever
            1 => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(LlmError::EmptyResponse)),
            _ => queue
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::EmptyResponse)),
        }
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifier-shaped JSON body
pub fn classification_json(label: &str, confidence: f64) -> String {
    serde_json::json!({ "label": label, "confidence": confidence }).to_string()
}

#[async_trait::async_trait]
impl LlmEngine for MockLlm {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());

        match self.script {
            Some(ref script) => Self::next_scripted(script),
            None => Ok(Self::classify_keywords(prompt)),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
