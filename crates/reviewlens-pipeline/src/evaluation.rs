//! Multi-label evaluation metrics
//!
//! Label sets are compared as binary indicator rows over the taxonomy, in
//! taxonomy order. Zero-division cases evaluate to 0.

use reviewlens_core::{EvaluationSample, TaxonomyLabel};
use std::fmt;

/// Aggregate scores for a validation run
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    /// Number of samples scored
    pub samples: usize,

    /// Percentage of samples whose predicted set equals the true set
    pub exact_match: f64,

    /// Percentage of samples sharing at least one label with the truth
    pub soft_match: f64,

    /// Sample-averaged intersection over union, as a percentage
    pub jaccard: f64,

    /// Micro-averaged F1 over all labels, in [0, 1]
    pub micro_f1: f64,

    /// Fraction of indicator cells that disagree
    pub hamming_loss: f64,
}

impl EvaluationReport {
    pub fn compute(samples: &[EvaluationSample]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                samples: 0,
                exact_match: 0.0,
                soft_match: 0.0,
                jaccard: 0.0,
                micro_f1: 0.0,
                hamming_loss: 0.0,
            };
        }

        let mut exact = 0usize;
        let mut soft = 0usize;
        let mut jaccard_sum = 0.0;
        let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
        let mut mismatched = 0usize;

        for sample in samples {
            let truth = sample.true_labels.indicator();
            let pred = sample.predicted_labels.indicator();

            if truth == pred {
                exact += 1;
            }
            if sample.is_soft_match() {
                soft += 1;
            }

            let intersection = sample.true_labels.intersection_len(&sample.predicted_labels);
            let union = sample.true_labels.union_len(&sample.predicted_labels);
            if union > 0 {
                jaccard_sum += intersection as f64 / union as f64;
            }

            for (t, p) in truth.iter().zip(pred.iter()) {
                match (t, p) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
                if t != p {
                    mismatched += 1;
                }
            }
        }

        let f1_denominator = 2 * tp + fp + fn_;
        let micro_f1 = if f1_denominator == 0 {
            0.0
        } else {
            (2 * tp) as f64 / f1_denominator as f64
        };

        Self {
            samples: n,
            exact_match: exact as f64 / n as f64 * 100.0,
            soft_match: soft as f64 / n as f64 * 100.0,
            jaccard: jaccard_sum / n as f64 * 100.0,
            micro_f1,
            hamming_loss: mismatched as f64 / (n * TaxonomyLabel::COUNT) as f64,
        }
    }

    /// One-line reading of the scores
    pub fn interpretation(&self) -> &'static str {
        if self.exact_match > 75.0 {
            "High precision achieved. The classifier is effectively capturing complex multi-label sets."
        } else {
            "Model shows strong theme identification. Review the Jaccard score for overlap quality."
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(45);
        writeln!(f, "{rule}")?;
        writeln!(f, "{:^45}", "FINAL VALIDATION METRICS")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<32}{:.2}%", "Strict Accuracy (Exact Match):", self.exact_match)?;
        writeln!(f, "{:<32}{:.2}%", "Soft Accuracy (Partial Match):", self.soft_match)?;
        writeln!(f, "{:<32}{:.2}%", "Jaccard Index (Avg Overlap):", self.jaccard)?;
        writeln!(f, "{:<32}{:.2}", "Micro F1-Score:", self.micro_f1)?;
        writeln!(f, "{:<32}{:.4}", "Hamming Loss (Lower is Better):", self.hamming_loss)?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        write!(f, "{}", self.interpretation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewlens_core::LabelSet;

    fn sample(truth: &[&str], pred: &[&str]) -> EvaluationSample {
        EvaluationSample::new(
            "review",
            LabelSet::from_factors(truth),
            LabelSet::from_factors(pred),
        )
    }

    #[test]
    fn test_perfect_predictions() {
        let report = EvaluationReport::compute(&[
            sample(&["Fragrance"], &["Fragrance"]),
            sample(&["Price", "Efficacy"], &["Efficacy", "Price"]),
        ]);
        assert_eq!(report.exact_match, 100.0);
        assert_eq!(report.soft_match, 100.0);
        assert_eq!(report.jaccard, 100.0);
        assert_eq!(report.micro_f1, 1.0);
        assert_eq!(report.hamming_loss, 0.0);
    }

    #[test]
    fn test_disjoint_predictions() {
        let report = EvaluationReport::compute(&[
            sample(&["Fragrance"], &["Price"]),
            sample(&["Packaging"], &[]),
        ]);
        assert_eq!(report.exact_match, 0.0);
        assert_eq!(report.soft_match, 0.0);
        assert_eq!(report.jaccard, 0.0);
        assert_eq!(report.micro_f1, 0.0);
        // 3 wrong cells out of 2 * 16
        assert!((report.hamming_loss - 3.0 / 32.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_overlap() {
        let report = EvaluationReport::compute(&[sample(&["Fragrance", "Price"], &["Price"])]);
        assert_eq!(report.exact_match, 0.0);
        assert_eq!(report.soft_match, 100.0);
        assert!((report.jaccard - 50.0).abs() < 1e-9);
        // tp=1 fp=0 fn=1
        assert!((report.micro_f1 - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sets_score_zero() {
        let report = EvaluationReport::compute(&[sample(&[], &[])]);
        assert_eq!(report.exact_match, 100.0);
        assert_eq!(report.jaccard, 0.0);
        assert_eq!(report.micro_f1, 0.0);
        assert_eq!(report.hamming_loss, 0.0);
    }

    #[test]
    fn test_no_samples() {
        let report = EvaluationReport::compute(&[]);
        assert_eq!(report.samples, 0);
        assert_eq!(report.exact_match, 0.0);
    }

    #[test]
    fn test_display_and_interpretation() {
        let good = EvaluationReport::compute(&[sample(&["Fragrance"], &["Fragrance"])]);
        let text = good.to_string();
        assert!(text.contains("Strict Accuracy (Exact Match):  100.00%"));
        assert!(text.contains("Hamming Loss (Lower is Better): 0.0000"));
        assert!(text.ends_with(good.interpretation()));
        assert!(good.interpretation().starts_with("High precision"));

        let poor = EvaluationReport::compute(&[sample(&["Fragrance"], &[])]);
        assert!(poor.interpretation().starts_with("Model shows"));
    }
}
