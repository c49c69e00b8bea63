//! Sequential batch labelling
//!
//! Reviews are processed strictly one at a time, in input order:
//!
//! 1. Missing or blank reviews get an empty label cell. The classifier and
//!    the drift monitor never see them.
//! 2. Anything else is normalized, the pacing delay is awaited, and the
//!    review is classified.
//! 3. The raw factors feed the drift monitor; the taxonomy-filtered labels
//!    are joined into the output cell.
//!
//! Output length always equals input length.

use crate::normalize::normalize_review;
use crate::table::{Table, LABEL_COLUMN, REVIEW_COLUMN};
use reviewlens_classifiers::Classifier;
use reviewlens_core::{ClassificationOutcome, Error, Result, TaxonomyLabel};
use reviewlens_telemetry::{DriftAlert, DriftMonitor, MetricsCollector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Batch pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Delay before each classified review, in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Log progress every N rows
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,

    /// Column holding review text
    #[serde(default = "default_review_column")]
    pub review_column: String,

    /// Column holding labels
    #[serde(default = "default_label_column")]
    pub label_column: String,
}

fn default_pacing_ms() -> u64 {
    2000
}

fn default_progress_every() -> usize {
    5
}

fn default_review_column() -> String {
    REVIEW_COLUMN.to_string()
}

fn default_label_column() -> String {
    LABEL_COLUMN.to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            progress_every: default_progress_every(),
            review_column: default_review_column(),
            label_column: default_label_column(),
        }
    }
}

impl PipelineConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_every == 0 {
            return Err(Error::config("pipeline progress_every must be at least 1"));
        }
        if self.review_column.trim().is_empty() || self.label_column.trim().is_empty() {
            return Err(Error::config("pipeline column names must not be empty"));
        }
        Ok(())
    }
}

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutput {
    /// One joined label cell per input row, in input order
    pub labels: Vec<String>,

    /// Drift alerts raised during the run, in order
    pub alerts: Vec<DriftAlert>,
}

/// Labels a sequence of reviews with a classifier
pub struct BatchPipeline {
    classifier: Arc<dyn Classifier>,
    monitor: DriftMonitor,
    config: PipelineConfig,
    metrics: MetricsCollector,
}

impl BatchPipeline {
    /// Create a pipeline with default pacing and a default drift monitor
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            monitor: DriftMonitor::new(),
            config: PipelineConfig::default(),
            metrics: MetricsCollector::new(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_monitor(mut self, monitor: DriftMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    /// Share run counters with the caller
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn monitor(&self) -> &DriftMonitor {
        &self.monitor
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Label every review in order
    pub async fn run(&mut self, reviews: &[Option<String>]) -> BatchOutput {
        let total = reviews.len();
        let pacing = self.config.pacing();
        let progress_every = self.config.progress_every.max(1);
        let mut output = BatchOutput {
            labels: Vec::with_capacity(total),
            alerts: Vec::new(),
        };

        info!(classifier = self.classifier.name(), rows = total, "starting batch");

        for (i, review) in reviews.iter().enumerate() {
            self.metrics.record_row();

            let Some(text) = review.as_deref().and_then(normalize_review) else {
                debug!(row = i, "skipping empty review");
                self.metrics.record_skip();
                metrics::counter!("reviewlens_rows_total", "status" => "skipped").increment(1);
                output.labels.push(String::new());
                continue;
            };

            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }

            let start = Instant::now();
            let result = self.classifier.classify(&text).await;
            let latency_us = start.elapsed().as_micros() as u64;

            if let Some(alert) = self.monitor.record(&result.factors) {
                self.metrics.record_drift_alert();
                output.alerts.push(alert);
            }

            let labels = result.labels();
            let in_taxonomy = result
                .factors
                .iter()
                .filter(|f| TaxonomyLabel::parse(f).is_some())
                .count();
            self.metrics.record_classification(
                result.attempts,
                result.factors.len(),
                in_taxonomy,
                result.outcome == ClassificationOutcome::Exhausted,
                latency_us,
            );
            metrics::counter!("reviewlens_rows_total", "status" => "classified").increment(1);

            debug!(row = i, labels = %labels, attempts = result.attempts, "review labelled");
            output.labels.push(labels.to_cell());

            if (i + 1) % progress_every == 0 {
                info!("Progress: {}/{} reviews processed.", i + 1, total);
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            rows = snapshot.rows_total,
            skipped = snapshot.rows_skipped,
            classified = snapshot.classified,
            empty = snapshot.empty_predictions,
            exhausted = snapshot.exhausted,
            drift_alerts = snapshot.drift_alerts,
            avg_attempts = snapshot.avg_attempts(),
            "batch complete"
        );

        output
    }

    /// Label the review column of a table in place
    pub async fn label_table(&mut self, table: &mut Table) -> Result<BatchOutput> {
        let reviews = table.column(&self.config.review_column)?;
        let output = self.run(&reviews).await;
        let cells = output.labels.iter().cloned().map(Some).collect();
        table.push_column(&self.config.label_column, cells)?;
        Ok(output)
    }

    /// Load `input`, label it, and write the labelled rows to `output` as CSV
    ///
    /// A missing input file is reported before any review is processed.
    pub async fn label_file(&mut self, input: &Path, output: &Path) -> Result<BatchOutput> {
        let mut table = Table::load(input)?;
        info!(path = %input.display(), rows = table.len(), "loaded reviews");

        let result = self.label_table(&mut table).await?;
        table.write_csv(output)?;

        info!("SUCCESS! Results saved to: {}", output.display());
        Ok(result)
    }
}
