//! Two-stage audit/reflexion classifier
//!
//! One attempt is two model calls:
//!
//! 1. **Audit**: the model reads the review against the taxonomy and returns
//!    `{"audit": "...", "factors": [...]}`.
//! 2. **Reflexion**: the model sees the review, its own audit and the
//!    candidate labels, and returns `{"factors": [...]}` keeping only labels
//!    with direct textual support.
//!
//! Any failure in either call (transport, service error, timeout,
//! unparseable output) abandons the attempt. The whole two-stage sequence is
//! retried after an exponential backoff of `2^(attempt + 1)` time units, up
//! to [`RetryPolicy::max_attempts`]. The final failure waits out its backoff
//! too, then the classifier returns an empty result rather than an error.

use crate::backend::{GenerationConfig, GenerationRequest, GenerativeBackend};
use crate::classifier::Classifier;
use crate::config::ClassifierConfig;
use crate::prompts::PromptTemplate;
use async_trait::async_trait;
use regex::Regex;
use reviewlens_core::{AuditResult, ClassificationResult, Error, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total two-stage attempts, including the first
    pub max_attempts: u32,

    /// Duration of one backoff time unit
    pub backoff_unit: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }

    /// Wait after the failed 0-based `attempt`: `2^(attempt + 1)` units
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_add(1)).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Longest total time a single classification can spend backing off
    ///
    /// Every failed attempt is followed by a wait, the last one included.
    pub fn max_total_backoff(&self) -> Duration {
        (0..self.max_attempts)
            .map(|attempt| self.backoff(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(7, Duration::from_secs(1))
    }
}

/// Protocol stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Audit,
    Reflexion,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audit => "audit",
            Self::Reflexion => "reflexion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stage response could not be used
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseFailure {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Why a single two-stage attempt was abandoned
#[derive(Debug, thiserror::Error)]
pub enum AttemptFailure {
    #[error("{stage} call failed: {source}")]
    Backend {
        stage: Stage,
        #[source]
        source: Error,
    },

    #[error("{stage} response unusable: {failure}")]
    Parse { stage: Stage, failure: ParseFailure },
}

impl AttemptFailure {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Backend { stage, .. } | Self::Parse { stage, .. } => *stage,
        }
    }
}

/// Turns raw model text into stage results
#[derive(Debug, Clone)]
pub struct ResponseParser {
    fence: Regex,
}

impl ResponseParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            fence: Regex::new(r"(?s)^```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)\r?\n?```$")
                .map_err(|e| Error::classifier(format!("Failed to compile fence regex: {}", e)))?,
        })
    }

    /// Parse the audit stage: a JSON object with optional `audit` and `factors`
    pub fn parse_audit(&self, text: &str) -> std::result::Result<AuditResult, ParseFailure> {
        match self.parse_json(text)? {
            Value::Object(mut obj) => {
                let audit = match obj.remove("audit") {
                    None | Some(Value::Null) => String::new(),
                    Some(Value::String(s)) => s,
                    Some(other) => other.to_string(),
                };
                let factors = coerce_factors(obj.remove("factors").unwrap_or(Value::Null));
                Ok(AuditResult { audit, factors })
            }
            other => Err(ParseFailure::NotAnObject(json_kind(&other))),
        }
    }

    /// Parse the reflexion stage; a bare value is treated as the factor list
    pub fn parse_reflexion(&self, text: &str) -> std::result::Result<Vec<String>, ParseFailure> {
        match self.parse_json(text)? {
            Value::Object(mut obj) => Ok(coerce_factors(
                obj.remove("factors").unwrap_or(Value::Null),
            )),
            bare => Ok(coerce_factors(bare)),
        }
    }

    fn parse_json(&self, text: &str) -> std::result::Result<Value, ParseFailure> {
        let trimmed = text.trim();
        let body = self
            .fence
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .map_or(trimmed, |m| m.as_str());
        serde_json::from_str(body).map_err(|e| ParseFailure::InvalidJson(e.to_string()))
    }
}

/// Strings from an array, a lone string as one factor, anything else as none
fn coerce_factors(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

enum RetryState {
    Attempting { attempt: u32 },
    Backoff { attempt: u32, wait: Duration },
    Succeeded { factors: Vec<String>, attempts: u32 },
    Exhausted { attempts: u32 },
}

/// LLM classifier running the audit/reflexion protocol
pub struct ReflexionClassifier {
    backend: Arc<dyn GenerativeBackend>,
    model: String,
    prompt: PromptTemplate,
    generation: GenerationConfig,
    retry: RetryPolicy,
    parser: ResponseParser,
}

impl ReflexionClassifier {
    /// Create a classifier with default prompt, temperature 0 and default retry
    pub fn new(backend: Arc<dyn GenerativeBackend>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            backend,
            model: model.into(),
            prompt: PromptTemplate::default(),
            generation: GenerationConfig::default(),
            retry: RetryPolicy::default(),
            parser: ResponseParser::new()?,
        })
    }

    /// Create a classifier from configuration
    pub fn from_config(backend: Arc<dyn GenerativeBackend>, config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(backend, config.model.clone())?
            .with_prompt(config.prompt)
            .with_temperature(config.temperature)
            .with_retry_policy(config.retry_policy()))
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.generation = GenerationConfig::json(temperature);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn prompt(&self) -> PromptTemplate {
        self.prompt
    }

    /// Run both stages once
    async fn attempt(&self, text: &str) -> std::result::Result<Vec<String>, AttemptFailure> {
        let raw = self
            .call(Stage::Audit, self.prompt.audit_prompt(text))
            .await?;
        let audit = self
            .parser
            .parse_audit(&raw)
            .map_err(|failure| AttemptFailure::Parse {
                stage: Stage::Audit,
                failure,
            })?;
        debug!(candidates = ?audit.factors, "audit complete");

        let raw = self
            .call(
                Stage::Reflexion,
                self.prompt
                    .reflexion_prompt(text, &audit.audit, &audit.factors),
            )
            .await?;
        self.parser
            .parse_reflexion(&raw)
            .map_err(|failure| AttemptFailure::Parse {
                stage: Stage::Reflexion,
                failure,
            })
    }

    async fn call(&self, stage: Stage, prompt: String) -> std::result::Result<String, AttemptFailure> {
        metrics::counter!("reviewlens_backend_calls_total", "stage" => stage.as_str()).increment(1);
        let request = GenerationRequest::new(self.model.clone(), prompt, self.generation.clone());
        self.backend
            .generate(&request)
            .await
            .map_err(|source| AttemptFailure::Backend { stage, source })
    }
}

#[async_trait]
impl Classifier for ReflexionClassifier {
    async fn classify(&self, text: &str) -> ClassificationResult {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut state = RetryState::Attempting { attempt: 0 };

        loop {
            state = match state {
                RetryState::Attempting { attempt } => match self.attempt(text).await {
                    Ok(factors) => RetryState::Succeeded {
                        factors,
                        attempts: attempt + 1,
                    },
                    Err(failure) => {
                        let wait = self.retry.backoff(attempt);
                        let last = attempt + 1 >= max_attempts;
                        warn!(
                            attempt = attempt + 1,
                            stage = %failure.stage(),
                            wait_secs = wait.as_secs_f64(),
                            error = %failure,
                            "server busy or error, {}",
                            if last { "giving up" } else { "retrying" }
                        );
                        if !last {
                            metrics::counter!("reviewlens_classify_retries_total").increment(1);
                        }
                        RetryState::Backoff { attempt, wait }
                    }
                },
                RetryState::Backoff { attempt, wait } => {
                    tokio::time::sleep(wait).await;
                    if attempt + 1 >= max_attempts {
                        RetryState::Exhausted {
                            attempts: attempt + 1,
                        }
                    } else {
                        RetryState::Attempting {
                            attempt: attempt + 1,
                        }
                    }
                }
                RetryState::Succeeded { factors, attempts } => {
                    let result = ClassificationResult::succeeded(factors, attempts);
                    metrics::counter!(
                        "reviewlens_classifications_total",
                        "outcome" => result.outcome.as_str()
                    )
                    .increment(1);
                    return result;
                }
                RetryState::Exhausted { attempts } => {
                    let result = ClassificationResult::exhausted(attempts);
                    metrics::counter!(
                        "reviewlens_classifications_total",
                        "outcome" => result.outcome.as_str()
                    )
                    .increment(1);
                    return result;
                }
            };
        }
    }

    fn name(&self) -> &str {
        "reflexion"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ResponseParser {
        ResponseParser::new().unwrap()
    }

    #[test]
    fn test_backoff_doubles_from_two_units() {
        let policy = RetryPolicy::default();
        let waits: Vec<u64> = (0..7).map(|a| policy.backoff(a).as_secs()).collect();
        assert_eq!(waits, vec![2, 4, 8, 16, 32, 64, 128]);
    }

    #[test]
    fn test_total_backoff_within_bound() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_total_backoff(), Duration::from_secs(254));
        assert_eq!(
            RetryPolicy::new(3, Duration::from_millis(10)).max_total_backoff(),
            Duration::from_millis(140)
        );
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert!(policy.backoff(64) >= policy.backoff(30));
    }

    #[test]
    fn test_parse_audit_defaults() {
        let parsed = parser().parse_audit("{}").unwrap();
        assert_eq!(parsed, AuditResult::default());

        let parsed = parser()
            .parse_audit(r#"{"audit": "Positive", "factors": ["Fragrance", 3, "Price"]}"#)
            .unwrap();
        assert_eq!(parsed.audit, "Positive");
        assert_eq!(parsed.factors, vec!["Fragrance", "Price"]);
    }

    #[test]
    fn test_parse_audit_rejects_non_object() {
        assert_eq!(
            parser().parse_audit(r#"["Fragrance"]"#),
            Err(ParseFailure::NotAnObject("an array"))
        );
        assert!(matches!(
            parser().parse_audit("Sure! Here is the JSON"),
            Err(ParseFailure::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_reflexion_wraps_bare_values() {
        let p = parser();
        assert_eq!(p.parse_reflexion(r#"["Price"]"#).unwrap(), vec!["Price"]);
        assert_eq!(p.parse_reflexion(r#""Price""#).unwrap(), vec!["Price"]);
        assert!(p.parse_reflexion("42").unwrap().is_empty());
        assert_eq!(
            p.parse_reflexion(r#"{"factors": "Efficacy"}"#).unwrap(),
            vec!["Efficacy"]
        );
        assert!(p.parse_reflexion(r#"{"labels": ["Price"]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_code_fences_are_stripped() {
        let p = parser();
        let fenced = "```json\n{\"factors\": [\"Packaging\"]}\n```";
        assert_eq!(p.parse_reflexion(fenced).unwrap(), vec!["Packaging"]);

        let bare_fence = "  ```\n{\"audit\": \"ok\"}```  ";
        assert_eq!(p.parse_audit(bare_fence).unwrap().audit, "ok");
    }

    #[test]
    fn test_non_string_audit_is_stringified() {
        let parsed = parser().parse_audit(r#"{"audit": {"tone": "mixed"}}"#).unwrap();
        assert_eq!(parsed.audit, r#"{"tone":"mixed"}"#);
    }
}
