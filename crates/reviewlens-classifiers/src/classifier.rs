//! Classifier trait

use async_trait::async_trait;
use reviewlens_core::ClassificationResult;

/// Trait for review classifiers
///
/// Classification never fails outright: a classifier that cannot produce
/// factors returns an empty result and the caller treats it as a miss.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a single normalized review
    async fn classify(&self, text: &str) -> ClassificationResult;

    /// Get the classifier name
    fn name(&self) -> &str;
}

