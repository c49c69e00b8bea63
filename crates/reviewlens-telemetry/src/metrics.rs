//! Run metrics collection and reporting

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for a single labelling or validation run
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    rows_total: AtomicU64,
    rows_skipped: AtomicU64,
    classified: AtomicU64,
    empty_predictions: AtomicU64,
    exhausted: AtomicU64,
    attempts: AtomicU64,
    labels_emitted: AtomicU64,
    labels_filtered: AtomicU64,
    drift_alerts: AtomicU64,
    classify_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                rows_total: AtomicU64::new(0),
                rows_skipped: AtomicU64::new(0),
                classified: AtomicU64::new(0),
                empty_predictions: AtomicU64::new(0),
                exhausted: AtomicU64::new(0),
                attempts: AtomicU64::new(0),
                labels_emitted: AtomicU64::new(0),
                labels_filtered: AtomicU64::new(0),
                drift_alerts: AtomicU64::new(0),
                classify_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record an input row, classified or not
    pub fn record_row(&self) {
        self.inner.rows_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a row skipped for missing review text
    pub fn record_skip(&self) {
        self.inner.rows_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one classifier invocation
    ///
    /// `produced` is the raw factor count, `kept` the count surviving
    /// taxonomy filtering.
    pub fn record_classification(
        &self,
        attempts: u32,
        produced: usize,
        kept: usize,
        exhausted: bool,
        latency_us: u64,
    ) {
        self.inner.classified.fetch_add(1, Ordering::Relaxed);
        self.inner
            .attempts
            .fetch_add(u64::from(attempts), Ordering::Relaxed);
        self.inner
            .labels_emitted
            .fetch_add(kept as u64, Ordering::Relaxed);
        self.inner
            .labels_filtered
            .fetch_add(produced.saturating_sub(kept) as u64, Ordering::Relaxed);
        self.inner
            .classify_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        if produced == 0 {
            self.inner.empty_predictions.fetch_add(1, Ordering::Relaxed);
        }
        if exhausted {
            self.inner.exhausted.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a drift alert
    pub fn record_drift_alert(&self) {
        self.inner.drift_alerts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rows_total: self.inner.rows_total.load(Ordering::Relaxed),
            rows_skipped: self.inner.rows_skipped.load(Ordering::Relaxed),
            classified: self.inner.classified.load(Ordering::Relaxed),
            empty_predictions: self.inner.empty_predictions.load(Ordering::Relaxed),
            exhausted: self.inner.exhausted.load(Ordering::Relaxed),
            attempts: self.inner.attempts.load(Ordering::Relaxed),
            labels_emitted: self.inner.labels_emitted.load(Ordering::Relaxed),
            labels_filtered: self.inner.labels_filtered.load(Ordering::Relaxed),
            drift_alerts: self.inner.drift_alerts.load(Ordering::Relaxed),
            classify_latency_us: self.inner.classify_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub rows_total: u64,
    pub rows_skipped: u64,
    pub classified: u64,
    pub empty_predictions: u64,
    pub exhausted: u64,
    pub attempts: u64,
    pub labels_emitted: u64,
    pub labels_filtered: u64,
    pub drift_alerts: u64,
    pub classify_latency_us: u64,
}

impl MetricsSnapshot {
    /// Share of classified reviews that came back with no factors
    pub fn empty_rate(&self) -> f64 {
        if self.classified == 0 {
            0.0
        } else {
            self.empty_predictions as f64 / self.classified as f64
        }
    }

    /// Average two-stage attempts per classified review
    pub fn avg_attempts(&self) -> f64 {
        if self.classified == 0 {
            0.0
        } else {
            self.attempts as f64 / self.classified as f64
        }
    }

    /// Average classifier latency per classified review
    pub fn avg_latency_us(&self) -> u64 {
        if self.classified == 0 {
            0
        } else {
            self.classify_latency_us / self.classified
        }
    }
}
