//! Reviewlens Classifiers
//!
//! LLM-backed classification of product reviews into the consumer-insight
//! taxonomy.
//!
//! The [`ReflexionClassifier`] runs a two-stage protocol against any
//! [`GenerativeBackend`]: an intent audit that proposes labels, then a
//! reflexion pass that drops labels without textual support. Failed attempts
//! are retried with bounded exponential backoff; exhaustion yields an empty
//! result, never an error.

pub mod backend;
pub mod classifier;
pub mod config;
pub mod gemini;
pub mod prompts;
pub mod reflexion;

pub use backend::{GenerationConfig, GenerationRequest, GenerativeBackend, JSON_MIME_TYPE};
pub use classifier::Classifier;
pub use config::ClassifierConfig;
pub use gemini::GeminiBackend;
pub use prompts::PromptTemplate;
pub use reflexion::{
    AttemptFailure, ParseFailure, ReflexionClassifier, ResponseParser, RetryPolicy, Stage,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::backend::{GenerationRequest, GenerativeBackend};
    pub use crate::classifier::Classifier;
    pub use crate::gemini::GeminiBackend;
    pub use crate::prompts::PromptTemplate;
    pub use crate::reflexion::{ReflexionClassifier, RetryPolicy};
}
