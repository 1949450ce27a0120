//! Decision combiner
//!
//! Precedence, evaluated in order:
//! 1. empty or whitespace-only text is SAFE without any external call
//! 2. a heuristic score above the spam override threshold blocks as SPAM
//! 3. otherwise the classifier label stands, blocking when it is not SAFE and
//!    its confidence exceeds the block threshold
//!
//! An ERROR classification has confidence 0 and therefore never blocks.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info};

use super::{ClassifierClient, ModerationLabel, ModerationVerdict, VerdictSource};
use crate::config::{ModerationConfig, PolicyConfig};
use crate::llm::LlmEngine;
use crate::spam::{HeuristicScore, HeuristicScorer};

/// Moderation engine
pub struct Moderator {
    scorer: HeuristicScorer,
    classifier: ClassifierClient,
    policy: PolicyConfig,
}

impl Moderator {
    /// Create a moderator with default policy and classifier settings
    pub fn new(llm: Arc<dyn LlmEngine>) -> Self {
        Self::with_classifier(ClassifierClient::new(llm))
    }

    pub fn with_classifier(classifier: ClassifierClient) -> Self {
        Self {
            scorer: HeuristicScorer::new(),
            classifier,
            policy: PolicyConfig::default(),
        }
    }

    /// Create a moderator from configuration around an already built engine
    pub fn from_config(config: &ModerationConfig, llm: Arc<dyn LlmEngine>) -> Self {
        let classifier = ClassifierClient::new(llm)
            .with_rate_limit_cooldown(config.classifier.rate_limit_cooldown())
            .with_deadline(Some(config.classifier.deadline()));

        Self::with_classifier(classifier).with_policy(config.policy.clone())
    }

    pub fn with_policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    pub fn model_name(&self) -> &str {
        self.classifier.model_name()
    }

    /// Heuristic score alone, without consulting the classifier
    pub fn heuristic_score(&self, text: &str) -> HeuristicScore {
        self.scorer.score(text)
    }

    /// Moderate a single message. Never fails; an unavailable classifier
    /// yields an ERROR verdict that is not blocked.
    pub async fn moderate(&self, text: &str) -> ModerationVerdict {
        if text.trim().is_empty() {
            debug!("Empty message, skipping classification");
            return ModerationVerdict {
                label: ModerationLabel::Safe,
                confidence: 1.0,
                blocked: false,
                source: VerdictSource::RuleBased,
            };
        }

        let heuristic = self.scorer.score(text);

        if heuristic.score > self.policy.spam_override_threshold {
            info!(
                "Blocked as SPAM by heuristics (score {:.1}, {} chars)",
                heuristic.score,
                text.chars().count()
            );
            return ModerationVerdict {
                label: ModerationLabel::Spam,
                confidence: heuristic.score,
                blocked: true,
                source: VerdictSource::RuleBased,
            };
        }

        let result = self.classifier.classify(text).await;
        let blocked = result.label != ModerationLabel::Safe
            && result.confidence > self.policy.block_confidence_threshold;

        info!(
            "Verdict {} (confidence {:.2}, blocked {}, heuristic {:.1})",
            result.label, result.confidence, blocked, heuristic.score
        );

        ModerationVerdict {
            label: result.label,
            confidence: result.confidence,
            blocked,
            source: VerdictSource::Llm,
        }
    }

    /// Moderate several messages concurrently, preserving input order
    pub async fn moderate_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<ModerationVerdict> {
        join_all(texts.iter().map(|text| self.moderate(text.as_ref()))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmError, MockLlmEngine};

    fn engine_replying(body: &'static str) -> MockLlmEngine {
        let mut llm = MockLlmEngine::new();
        llm.expect_generate().returning(move |_| Ok(body.to_string()));
        llm.expect_model_name().return_const("mock".to_string());
        llm
    }

    #[tokio::test]
    async fn test_heuristic_override_skips_classifier() {
        let mut llm = MockLlmEngine::new();
        llm.expect_generate().times(0);
        llm.expect_model_name().return_const("mock".to_string());

        let moderator = Moderator::new(Arc::new(llm));
        let verdict = moderator
            .moderate("aaaaaaaaaa http://a.com http://b.com WIN WIN WIN WIN")
            .await;

        assert_eq!(verdict.label, ModerationLabel::Spam);
        assert_eq!(verdict.confidence, 0.8);
        assert!(verdict.blocked);
        assert_eq!(verdict.source, VerdictSource::RuleBased);
    }

    #[tokio::test]
    async fn test_score_at_threshold_goes_to_classifier() {
        // caps + run + repeated word = 0.6, not above 0.6
        let moderator = Moderator::new(Arc::new(engine_replying(
            r#"{"label": "SAFE", "confidence": 0.9}"#,
        )));
        let verdict = moderator.moderate("WIN WIN AAAAAA").await;

        assert_eq!(verdict.source, VerdictSource::Llm);
        assert_eq!(verdict.label, ModerationLabel::Safe);
        assert!(!verdict.blocked);
    }

    #[tokio::test]
    async fn test_confident_unsafe_label_blocks() {
        let moderator = Moderator::new(Arc::new(engine_replying(
            r#"{"label": "HARASSMENT", "confidence": 0.85}"#,
        )));
        let verdict = moderator.moderate("you are useless").await;

        assert_eq!(
            verdict,
            ModerationVerdict {
                label: ModerationLabel::Harassment,
                confidence: 0.85,
                blocked: true,
                source: VerdictSource::Llm,
            }
        );
    }

    #[tokio::test]
    async fn test_confidence_must_exceed_threshold() {
        let moderator = Moderator::new(Arc::new(engine_replying(
            r#"{"label": "VIOLENCE", "confidence": 0.7}"#,
        )));
        let verdict = moderator.moderate("borderline").await;

        assert_eq!(verdict.label, ModerationLabel::Violence);
        assert!(!verdict.blocked);
    }

    #[tokio::test]
    async fn test_classifier_failure_fails_open() {
        let mut llm = MockLlmEngine::new();
        llm.expect_generate()
            .times(1)
            .returning(|_| Err(LlmError::Transport("connection refused".into())));
        llm.expect_model_name().return_const("mock".to_string());

        let moderator = Moderator::new(Arc::new(llm));
        let verdict = moderator.moderate("hello").await;

        assert_eq!(verdict.label, ModerationLabel::Error);
        assert_eq!(verdict.confidence, 0.0);
        assert!(!verdict.blocked);
        assert_eq!(verdict.source, VerdictSource::Llm);
        assert!(verdict.is_unavailable());
    }

    #[tokio::test]
    async fn test_empty_text_skips_classifier() {
        let mut llm = MockLlmEngine::new();
        llm.expect_generate().times(0);
        llm.expect_model_name().return_const("mock".to_string());

        let moderator = Moderator::new(Arc::new(llm));
        for text in ["", "   ", "\n\t"] {
            let verdict = moderator.moderate(text).await;
            assert_eq!(verdict.label, ModerationLabel::Safe);
            assert_eq!(verdict.confidence, 1.0);
            assert!(!verdict.blocked);
            assert_eq!(verdict.source, VerdictSource::RuleBased);
        }
    }

    #[tokio::test]
    async fn test_custom_policy() {
        let moderator = Moderator::new(Arc::new(engine_replying(
            r#"{"label": "SPAM", "confidence": 0.6}"#,
        )))
        .with_policy(PolicyConfig {
            spam_override_threshold: 0.3,
            block_confidence_threshold: 0.5,
        });
        assert_eq!(moderator.policy().spam_override_threshold, 0.3);

        // two links alone (0.4) now trigger the override
        let verdict = moderator.moderate("http://a.com http://b.com").await;
        assert_eq!(verdict.source, VerdictSource::RuleBased);

        let verdict = moderator.moderate("cheap watches").await;
        assert_eq!(verdict.source, VerdictSource::Llm);
        assert!(verdict.blocked);
    }
}
