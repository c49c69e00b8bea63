//! Reviewlens Core
//!
//! Core types, traits, and utilities shared across reviewlens components.
//!
//! This crate provides:
//! - The fixed consumer-insight taxonomy and its ordered label sets
//! - Codecs for label sets at the CSV boundary (joined cells, list literals)
//! - Stage and result types for the audit/reflexion protocol
//! - Error types and result handling

pub mod error;
pub mod labels;
pub mod taxonomy;
pub mod types;

pub use error::{Error, Result};
pub use labels::{encode_label_literal, parse_label_literal, LabelSet, LABEL_DELIMITER};
pub use taxonomy::TaxonomyLabel;
pub use types::{
    AuditResult, ClassificationOutcome, ClassificationResult, EvaluationSample,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::labels::LabelSet;
    pub use crate::taxonomy::TaxonomyLabel;
    pub use crate::types::{AuditResult, ClassificationResult, EvaluationSample};
}
