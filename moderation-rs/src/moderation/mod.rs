//! Moderation decisions
//!
//! [`Moderator`] combines the heuristic [`crate::spam::HeuristicScorer`] with
//! the LLM-backed [`ClassifierClient`] into a single [`ModerationVerdict`].

pub mod classifier;
pub mod engine;

pub use classifier::ClassifierClient;
pub use engine::Moderator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Moderation label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationLabel {
    Safe,
    HateSpeech,
    Harassment,
    Spam,
    Violence,
    Sexual,
    /// Moderation was unavailable for this message
    Error,
}

impl ModerationLabel {
    /// Labels the external classifier may answer with
    pub const CLASSIFIER_LABELS: [ModerationLabel; 6] = [
        ModerationLabel::Safe,
        ModerationLabel::HateSpeech,
        ModerationLabel::Harassment,
        ModerationLabel::Spam,
        ModerationLabel::Sexual,
        ModerationLabel::Violence,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationLabel::Safe => "SAFE",
            ModerationLabel::HateSpeech => "HATE_SPEECH",
            ModerationLabel::Harassment => "HARASSMENT",
            ModerationLabel::Spam => "SPAM",
            ModerationLabel::Violence => "VIOLENCE",
            ModerationLabel::Sexual => "SEXUAL",
            ModerationLabel::Error => "ERROR",
        }
    }

    /// Parse a label produced by the classifier. `ERROR` is not accepted.
    pub fn from_classifier(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::CLASSIFIER_LABELS
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for ModerationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which signal produced the final label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    RuleBased,
    Llm,
}

/// Output of the external classifier, normalized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult {
    pub label: ModerationLabel,
    /// In [0, 1]
    pub confidence: f64,
}

impl ClassifierResult {
    /// Sentinel for "classifier unavailable"
    pub fn error() -> Self {
        Self {
            label: ModerationLabel::Error,
            confidence: 0.0,
        }
    }

    pub fn is_error(&self) -> bool {
        self.label == ModerationLabel::Error
    }
}

/// Final moderation decision for one message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub label: ModerationLabel,
    /// In [0, 1]
    pub confidence: f64,
    /// Whether the message should be suppressed
    pub blocked: bool,
    pub source: VerdictSource,
}

impl ModerationVerdict {
    /// Moderation could not be performed; callers decide whether to fail open
    pub fn is_unavailable(&self) -> bool {
        self.label == ModerationLabel::Error
    }
}
