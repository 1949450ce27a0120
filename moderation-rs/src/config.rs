//! Configuration for moderation-rs
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `MODERATION__<SECTION>__<KEY>` environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ModerationError, Result};

/// Environment variable consulted for the Gemini key when none is configured
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Upper bound accepted for `classifier.max_retries`
pub const MAX_TRANSPORT_RETRIES: u32 = 10;

/// Main moderation configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// External classifier configuration
    pub classifier: ClassifierConfig,
    /// Decision thresholds
    pub policy: PolicyConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:8088")
    pub listen_addr: String,
}

/// Which classification backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    Ollama,
    Mock,
}

/// Classifier configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub provider: Provider,
    /// Model identifier passed to the provider
    pub model: String,
    /// API credential (Gemini only)
    pub api_key: Option<String>,
    /// Override for the provider endpoint
    pub base_url: Option<String>,
    pub temperature: f32,
    /// Transport-level retries for transient failures
    pub max_retries: u32,
    /// Pause before the single retry after a rate-limit response
    pub rate_limit_cooldown_secs: u64,
    /// Upper bound on one classification including cooldown and retries
    pub deadline_secs: u64,
}

/// Decision thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Heuristic score above which a message is blocked as SPAM
    pub spam_override_threshold: f64,
    /// Classifier confidence above which a non-SAFE label blocks
    pub block_confidence_threshold: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8088".to_string(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            base_url: None,
            temperature: 0.1,
            max_retries: 3,
            rate_limit_cooldown_secs: 60,
            deadline_secs: 120,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            spam_override_threshold: 0.6,
            block_confidence_threshold: 0.7,
        }
    }
}

impl ClassifierConfig {
    pub fn rate_limit_cooldown(&self) -> Duration {
        Duration::from_secs(self.rate_limit_cooldown_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl ModerationConfig {
    /// Load configuration from an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ModerationError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(::config::File::from(path));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix("MODERATION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: ModerationConfig = settings.try_deserialize()?;

        if config.classifier.api_key.is_none() {
            config.classifier.api_key = std::env::var(GOOGLE_API_KEY_ENV)
                .ok()
                .filter(|key| !key.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string, without environment overlay
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ModerationConfig = toml::from_str(content)
            .map_err(|e| ModerationError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("policy.spam_override_threshold", self.policy.spam_override_threshold),
            ("policy.block_confidence_threshold", self.policy.block_confidence_threshold),
        ];

        for (name, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(ModerationError::Config(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.classifier.model.trim().is_empty() {
            return Err(ModerationError::Config("classifier.model is empty".to_string()));
        }

        if self.classifier.max_retries > MAX_TRANSPORT_RETRIES {
            return Err(ModerationError::Config(format!(
                "classifier.max_retries must be at most {}, got {}",
                MAX_TRANSPORT_RETRIES, self.classifier.max_retries
            )));
        }

        if self.classifier.deadline_secs == 0 {
            return Err(ModerationError::Config(
                "classifier.deadline_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(ref base_url) = self.classifier.base_url {
            reqwest::Url::parse(base_url).map_err(|e| {
                ModerationError::Config(format!("Invalid base_url '{}': {}", base_url, e))
            })?;
        }

        Ok(())
    }
}
