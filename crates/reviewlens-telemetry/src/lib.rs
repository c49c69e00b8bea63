//! Reviewlens Telemetry
//!
//! Quality tracking for classification runs.
//!
//! Provides:
//! - Sliding-window drift detection over classification outcomes
//! - Run counters and derived rates for end-of-run summaries

pub mod drift;
pub mod metrics;

pub use crate::drift::{DriftAlert, DriftConfig, DriftMonitor};
pub use crate::metrics::{MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::drift::{DriftAlert, DriftMonitor};
    pub use crate::metrics::MetricsCollector;
}
