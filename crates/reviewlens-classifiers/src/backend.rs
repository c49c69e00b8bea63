//! Generative backend seam
//!
//! The classifier only ever needs "prompt in, text out". Everything about
//! transport, authentication and response envelopes lives behind
//! [`GenerativeBackend`], so the protocol can be driven by scripted mocks.

use async_trait::async_trait;
use reviewlens_core::Result;
use serde::{Deserialize, Serialize};

/// MIME type requested for structured responses
pub const JSON_MIME_TYPE: &str = "application/json";

/// Sampling settings for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Sampling temperature
    pub temperature: f32,

    /// Requested response MIME type, if any
    pub response_mime_type: Option<String>,
}

impl GenerationConfig {
    /// Deterministic JSON output at the given temperature
    pub fn json(temperature: f32) -> Self {
        Self {
            temperature,
            response_mime_type: Some(JSON_MIME_TYPE.to_string()),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::json(0.0)
    }
}

/// A single prompt sent to a model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Model identifier, e.g. `models/gemini-2.5-flash`
    pub model: String,

    /// Full prompt text
    pub prompt: String,

    pub config: GenerationConfig,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            config,
        }
    }
}

/// Trait for text generation services
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Run one generation and return the raw response text
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Get the backend name
    fn name(&self) -> &str;
}
