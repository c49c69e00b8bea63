//! Sliding-window drift detection
//!
//! Every classified review appends one outcome to an append-only log:
//! success when the classifier produced at least one factor, failure
//! otherwise. Once the log holds a full window, the failure rate over the
//! most recent window is re-evaluated after each record and an alert is
//! raised when it strictly exceeds the configured threshold.
//!
//! Detection only: an alert is logged and counted, the caller keeps going.

use reviewlens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Drift monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Window failure rate that must be exceeded to alert
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Number of most recent outcomes considered
    #[serde(default = "default_window")]
    pub window: usize,
}

impl DriftConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::config(format!(
                "drift threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.window == 0 {
            return Err(Error::config("drift window must be at least 1"));
        }
        Ok(())
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            window: default_window(),
        }
    }
}

fn default_threshold() -> f64 {
    0.2
}

fn default_window() -> usize {
    5
}

/// Raised when the recent failure rate exceeds the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct DriftAlert {
    /// Failure rate over the window that triggered the alert
    pub failure_rate: f64,

    /// Window size the rate was computed over
    pub window: usize,

    /// Outcomes recorded so far, including the triggering one
    pub total_recorded: usize,
}

/// Append-only outcome log with a sliding-window failure check
#[derive(Debug, Clone)]
pub struct DriftMonitor {
    outcomes: Vec<bool>,
    config: DriftConfig,
}

impl DriftMonitor {
    /// Create a monitor with the default threshold (0.2) and window (5)
    pub fn new() -> Self {
        Self::with_config(DriftConfig::default())
    }

    /// Create a monitor with a custom threshold
    pub fn with_threshold(threshold: f64) -> Self {
        Self::with_config(DriftConfig {
            threshold,
            ..Default::default()
        })
    }

    pub fn with_config(config: DriftConfig) -> Self {
        Self {
            outcomes: Vec::new(),
            config,
        }
    }

    /// Record the factors produced for one review
    pub fn record<S: AsRef<str>>(&mut self, factors: &[S]) -> Option<DriftAlert> {
        self.record_outcome(!factors.is_empty())
    }

    /// Record a raw success/failure outcome
    pub fn record_outcome(&mut self, success: bool) -> Option<DriftAlert> {
        self.outcomes.push(success);
        metrics::counter!(
            "reviewlens_outcomes_total",
            "result" => if success { "success" } else { "failure" }
        )
        .increment(1);

        let failure_rate = self.failure_rate()?;
        metrics::gauge!("reviewlens_window_failure_rate").set(failure_rate);
        debug!(failure_rate, recorded = self.outcomes.len(), "drift window evaluated");

        if failure_rate > self.config.threshold {
            let alert = DriftAlert {
                failure_rate,
                window: self.config.window,
                total_recorded: self.outcomes.len(),
            };
            metrics::counter!("reviewlens_drift_alerts_total").increment(1);
            warn!(
                failure_rate = alert.failure_rate,
                threshold = self.config.threshold,
                window = alert.window,
                recorded = alert.total_recorded,
                "ALERT: concept drift detected, recent classifications are coming back empty"
            );
            return Some(alert);
        }

        None
    }

    /// Failure rate over the most recent window, once a full window exists
    pub fn failure_rate(&self) -> Option<f64> {
        let window = self.config.window;
        if self.outcomes.len() < window {
            return None;
        }
        let recent = &self.outcomes[self.outcomes.len() - window..];
        let failures = recent.iter().filter(|ok| !**ok).count();
        Some(failures as f64 / window as f64)
    }

    /// Number of outcomes recorded
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Total failures over the whole run
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|ok| !**ok).count()
    }

    /// Full outcome history, oldest first
    pub fn history(&self) -> &[bool] {
        &self.outcomes
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }
}

impl Default for DriftMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feed(monitor: &mut DriftMonitor, outcomes: &[u8]) -> Vec<Option<DriftAlert>> {
        outcomes
            .iter()
            .map(|o| monitor.record_outcome(*o == 1))
            .collect()
    }

    #[test]
    fn test_no_alert_before_full_window() {
        let mut monitor = DriftMonitor::new();
        let alerts = feed(&mut monitor, &[0, 0, 0, 0]);
        assert!(alerts.iter().all(Option::is_none));
        assert_eq!(monitor.failure_rate(), None);
    }

    #[test]
    fn test_all_failures_alert() {
        let mut monitor = DriftMonitor::new();
        let alerts = feed(&mut monitor, &[0, 0, 0, 0, 0]);
        let alert = alerts[4].clone().expect("fifth failure should alert");
        assert_eq!(alert.failure_rate, 1.0);
        assert_eq!(alert.window, 5);
        assert_eq!(alert.total_recorded, 5);
    }

    #[test]
    fn test_all_successes_do_not_alert() {
        let mut monitor = DriftMonitor::new();
        let alerts = feed(&mut monitor, &[1, 1, 1, 1, 1]);
        assert!(alerts.iter().all(Option::is_none));
        assert_eq!(monitor.failure_rate(), Some(0.0));
    }

    #[test]
    fn test_threshold_boundary_is_exclusive() {
        let mut monitor = DriftMonitor::with_threshold(0.2);
        let alerts = feed(&mut monitor, &[1, 1, 1, 1, 0]);
        assert!(alerts[4].is_none());
        assert_eq!(monitor.failure_rate(), Some(0.2));
    }

    #[test]
    fn test_window_slides_over_history() {
        let mut monitor = DriftMonitor::new();
        feed(&mut monitor, &[0, 0, 0, 0, 0]);
        let alerts = feed(&mut monitor, &[1, 1, 1, 1]);
        // After four successes the window is [0,1,1,1,1]: rate 0.2, no alert.
        assert!(alerts[3].is_none());
        assert_eq!(monitor.len(), 9);
        assert_eq!(monitor.failures(), 5);
    }

    #[test]
    fn test_record_uses_factor_presence() {
        let mut monitor = DriftMonitor::new();
        monitor.record(&["Price"]);
        monitor.record::<&str>(&[]);
        assert_eq!(monitor.history(), &[true, false]);
    }

    #[test]
    fn test_config_validation() {
        assert!(DriftConfig::default().validate().is_ok());
        assert!(DriftConfig { threshold: 1.5, window: 5 }.validate().is_err());
        assert!(DriftConfig { threshold: 0.2, window: 0 }.validate().is_err());
    }

    #[test]
    fn test_config_defaults_from_yaml() {
        let config: DriftConfig = serde_yaml::from_str("threshold: 0.4").unwrap();
        assert_eq!(config.threshold, 0.4);
        assert_eq!(config.window, 5);
    }

    proptest! {
        #[test]
        fn prop_history_is_never_discarded(outcomes in proptest::collection::vec(any::<bool>(), 0..40)) {
            let mut monitor = DriftMonitor::new();
            for ok in &outcomes {
                monitor.record_outcome(*ok);
            }
            prop_assert_eq!(monitor.history(), outcomes.as_slice());
        }

        #[test]
        fn prop_alert_iff_window_rate_exceeds_threshold(outcomes in proptest::collection::vec(any::<bool>(), 0..40)) {
            let mut monitor = DriftMonitor::new();
            for (i, ok) in outcomes.iter().enumerate() {
                let alert = monitor.record_outcome(*ok);
                let seen = &outcomes[..=i];
                let expected = seen.len() >= 5
                    && seen[seen.len() - 5..].iter().filter(|o| !**o).count() >= 2;
                prop_assert_eq!(alert.is_some(), expected);
            }
        }
    }
}
