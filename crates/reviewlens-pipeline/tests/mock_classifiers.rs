//! Mock classifiers for testing
//!
//! Provides configurable implementations of the Classifier trait for
//! driving the batch pipeline and validator without a generative backend.

#![allow(dead_code)]

use async_trait::async_trait;
use reviewlens_classifiers::Classifier;
use reviewlens_core::ClassificationResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// A classifier that answers from a lookup table
pub struct MockClassifier {
    name: String,
    answers: HashMap<String, Vec<String>>,
    default: Vec<String>,
    seen: Mutex<Vec<String>>,
    call_count: AtomicU32,
}

impl MockClassifier {
    /// Create a mock that returns no factors unless told otherwise
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            answers: HashMap::new(),
            default: Vec::new(),
            seen: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Return `factors` for exactly this (normalized) text
    pub fn with_answer(mut self, text: &str, factors: &[&str]) -> Self {
        self.answers
            .insert(text.to_string(), factors.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Return `factors` for any text without a specific answer
    pub fn with_default(mut self, factors: &[&str]) -> Self {
        self.default = factors.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Get the number of times classify was called
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Texts received, in call order
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, text: &str) -> ClassificationResult {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.seen.lock().unwrap().push(text.to_string());

        let factors = self
            .answers
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default.clone());
        ClassificationResult::succeeded(factors, 1)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A classifier that always exhausts its retries
pub struct ExhaustedClassifier {
    call_count: AtomicU32,
}

impl ExhaustedClassifier {
    pub fn new() -> Self {
        Self {
            call_count: AtomicU32::new(0),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Classifier for ExhaustedClassifier {
    async fn classify(&self, _text: &str) -> ClassificationResult {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        ClassificationResult::exhausted(7)
    }

    fn name(&self) -> &str {
        "exhausted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_classifier_answers() {
        let classifier = MockClassifier::new("mock")
            .with_answer("nice smell", &["Fragrance"])
            .with_default(&["Price"]);

        assert_eq!(classifier.classify("nice smell").await.factors, vec!["Fragrance"]);
        assert_eq!(classifier.classify("other").await.factors, vec!["Price"]);
        assert_eq!(classifier.call_count(), 2);
        assert_eq!(classifier.seen(), vec!["nice smell", "other"]);
    }

    #[tokio::test]
    async fn test_exhausted_classifier() {
        let classifier = ExhaustedClassifier::new();
        assert!(classifier.classify("x").await.factors.is_empty());
        assert_eq!(classifier.call_count(), 1);
    }
}
