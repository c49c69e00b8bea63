//! Validation against human-labelled samples

use crate::evaluation::EvaluationReport;
use crate::normalize::normalize_review;
use crate::table::Table;
use rand::prelude::*;
use reviewlens_classifiers::Classifier;
use reviewlens_core::{parse_label_literal, Error, EvaluationSample, LabelSet, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Rows sampled per run
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Fixed RNG seed for reproducible samples
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_sample_size() -> usize {
    10
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            seed: None,
        }
    }
}

impl ValidationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            return Err(Error::config("validation sample_size must be at least 1"));
        }
        Ok(())
    }
}

/// A review with its human-assigned labels
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledReview {
    pub text: Option<String>,
    pub truth: LabelSet,
}

/// Decode a ground-truth cell; anything unparseable is an empty set
pub fn parse_truth(cell: Option<&str>) -> LabelSet {
    let Some(cell) = cell else {
        return LabelSet::new();
    };
    match parse_label_literal(cell) {
        Ok(labels) => LabelSet::from_factors(labels),
        Err(e) => {
            warn!(cell, error = %e, "unparseable ground truth, treating as empty");
            LabelSet::new()
        }
    }
}

/// Read ground truth from an aggregated table
pub fn ground_truth_from_table(
    table: &Table,
    text_column: &str,
    label_column: &str,
) -> Result<Vec<LabelledReview>> {
    let texts = table.column(text_column)?;
    let labels = table.column(label_column)?;
    Ok(texts
        .into_iter()
        .zip(labels)
        .map(|(text, cell)| LabelledReview {
            text,
            truth: parse_truth(cell.as_deref()),
        })
        .collect())
}

/// Per-sample results and the scores computed from them
#[derive(Debug, Clone)]
pub struct ValidationRun {
    pub samples: Vec<EvaluationSample>,
    pub report: EvaluationReport,
}

/// Re-classifies a random sample of labelled reviews and scores the output
pub struct Validator {
    classifier: Arc<dyn Classifier>,
    config: ValidationConfig,
    rng: StdRng,
}

impl Validator {
    /// Create a validator with default settings
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self::with_config(classifier, ValidationConfig::default())
    }

    /// Create a validator; a configured seed makes sampling reproducible
    pub fn with_config(classifier: Arc<dyn Classifier>, config: ValidationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            classifier,
            config,
            rng,
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Row indices to validate, at most `sample_size` and never more than exist
    pub fn sample_indices(&mut self, rows: usize) -> Vec<usize> {
        let amount = self.config.sample_size.min(rows);
        rand::seq::index::sample(&mut self.rng, rows, amount).into_vec()
    }

    /// Sample, re-classify, and score
    pub async fn run(&mut self, rows: &[LabelledReview]) -> ValidationRun {
        let indices = self.sample_indices(rows.len());
        let total = indices.len();
        info!(
            samples = total,
            classifier = self.classifier.name(),
            "Processing validation samples"
        );

        let mut samples = Vec::with_capacity(total);
        for (n, index) in indices.into_iter().enumerate() {
            let row = &rows[index];
            let text = row
                .text
                .as_deref()
                .and_then(normalize_review)
                .unwrap_or_default();

            let predicted = if text.is_empty() {
                LabelSet::new()
            } else {
                self.classifier.classify(&text).await.labels()
            };

            samples.push(EvaluationSample::new(text, row.truth.clone(), predicted));
            info!("Verified sample {}/{} [Index: {}]", n + 1, total, index);
        }

        let report = EvaluationReport::compute(&samples);
        ValidationRun { samples, report }
    }
}

/// Validate a classifier against an aggregated training CSV
pub async fn validate_file(
    validator: &mut Validator,
    input: &Path,
    text_column: &str,
    label_column: &str,
) -> Result<ValidationRun> {
    let table = Table::load(input)?;
    let rows = ground_truth_from_table(&table, text_column, label_column)?;
    Ok(validator.run(&rows).await)
}
