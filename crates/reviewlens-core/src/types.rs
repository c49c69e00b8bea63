//! Core types for reviewlens

use crate::labels::LabelSet;
use serde::{Deserialize, Serialize};

/// Stage-1 output: a free-text intent audit and the candidate labels it proposes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Sentiment / intent rationale
    #[serde(default)]
    pub audit: String,

    /// Candidate labels, untrusted model text
    #[serde(default)]
    pub factors: Vec<String>,
}

/// How a classification run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationOutcome {
    /// Both stages completed on some attempt
    Succeeded,
    /// Every attempt failed; factors are empty
    Exhausted,
}

impl ClassificationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Final stage-2 output for one review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Verified factors as returned by the model (not yet filtered)
    pub factors: Vec<String>,

    /// Number of two-stage attempts made
    pub attempts: u32,

    /// Whether the protocol succeeded or gave up
    pub outcome: ClassificationOutcome,
}

impl ClassificationResult {
    /// A successful result
    pub fn succeeded(factors: Vec<String>, attempts: u32) -> Self {
        Self {
            factors,
            attempts,
            outcome: ClassificationOutcome::Succeeded,
        }
    }

    /// The soft-failure result returned once retries are exhausted
    pub fn exhausted(attempts: u32) -> Self {
        Self {
            factors: Vec::new(),
            attempts,
            outcome: ClassificationOutcome::Exhausted,
        }
    }

    /// Factors restricted to the taxonomy
    pub fn labels(&self) -> LabelSet {
        LabelSet::from_factors(&self.factors)
    }

    /// Whether any factor at all was produced
    pub fn has_factors(&self) -> bool {
        !self.factors.is_empty()
    }
}

/// One validation row: ground truth against a fresh prediction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationSample {
    pub text: String,
    pub true_labels: LabelSet,
    pub predicted_labels: LabelSet,
}

impl EvaluationSample {
    pub fn new(text: impl Into<String>, true_labels: LabelSet, predicted_labels: LabelSet) -> Self {
        Self {
            text: text.into(),
            true_labels,
            predicted_labels,
        }
    }

    /// Predicted and true sets are identical
    pub fn is_exact_match(&self) -> bool {
        self.true_labels == self.predicted_labels
    }

    /// Predicted and true sets share at least one label
    pub fn is_soft_match(&self) -> bool {
        self.true_labels.overlaps(&self.predicted_labels)
    }
}
