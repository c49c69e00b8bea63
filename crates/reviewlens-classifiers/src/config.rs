//! Configuration for the review classifier

use crate::gemini::DEFAULT_BASE_URL;
use crate::prompts::PromptTemplate;
use crate::reflexion::RetryPolicy;
use reviewlens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Classifier and backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sampling temperature for both stages
    ///
    /// Labelling runs use 0. Other values in [0, 2] are an opt-in for
    /// prompt experiments and change what the classifier returns.
    #[serde(default)]
    pub temperature: f32,

    /// Two-stage attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff time unit in milliseconds
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Prompt wording variant
    #[serde(default)]
    pub prompt: PromptTemplate,
}

fn default_model() -> String {
    "models/gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_attempts() -> u32 {
    7
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            temperature: 0.0,
            max_attempts: default_max_attempts(),
            backoff_unit_ms: default_backoff_unit_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            prompt: PromptTemplate::default(),
        }
    }
}

impl ClassifierConfig {
    /// Retry policy described by this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_unit_ms))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::config("classifier model must not be empty"));
        }
        if self.max_attempts == 0 {
            return Err(Error::config("classifier max_attempts must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::config(format!(
                "classifier temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::config("classifier request_timeout_secs must be positive"));
        }
        Ok(())
    }
}
