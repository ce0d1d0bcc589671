//! Binary classification metrics

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Counts of prediction outcomes with 1 as the positive class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            anyhow::bail!(
                "Label count ({}) does not match prediction count ({})",
                y_true.len(),
                y_pred.len()
            );
        }

        let mut cm = Self::default();
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            match (truth == 1, pred == 1) {
                (true, true) => cm.true_positives += 1,
                (false, true) => cm.false_positives += 1,
                (false, false) => cm.true_negatives += 1,
                (true, false) => cm.false_negatives += 1,
            }
        }
        Ok(cm)
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

/// Full metric set reported on the terminal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion: ConfusionMatrix,
}

/// The record persisted by the evaluator: exactly two fields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub accuracy: f64,
    pub f1_score: f64,
}

impl ClassificationMetrics {
    /// Compute all metrics over the full set.
    ///
    /// Precision, recall and F1 fall back to 0.0 when their denominator is
    /// zero (no predicted positives, no actual positives, or neither).
    pub fn compute(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.is_empty() {
            anyhow::bail!("Cannot compute metrics on an empty set");
        }
        let cm = ConfusionMatrix::from_predictions(y_true, y_pred)?;

        let tp = cm.true_positives as f64;
        let accuracy = (cm.true_positives + cm.true_negatives) as f64 / cm.total() as f64;
        let precision = ratio(tp, tp + cm.false_positives as f64);
        let recall = ratio(tp, tp + cm.false_negatives as f64);
        let f1_score = ratio(2.0 * precision * recall, precision + recall);

        Ok(Self {
            accuracy,
            precision,
            recall,
            f1_score,
            confusion: cm,
        })
    }

    pub fn record(&self) -> MetricsRecord {
        MetricsRecord {
            accuracy: self.accuracy,
            f1_score: self.f1_score,
        }
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let y_true = [1, 1, 1, 0, 0, 0, 0, 0];
        let y_pred = [1, 1, 0, 1, 0, 0, 0, 0];
        let m = ClassificationMetrics::compute(&y_true, &y_pred).unwrap();
        assert_eq!(m.confusion.true_positives, 2);
        assert_eq!(m.confusion.false_positives, 1);
        assert_eq!(m.confusion.false_negatives, 1);
        assert!((m.accuracy - 0.75).abs() < 1e-12);
        assert!((m.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((m.f1_score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_predicted_positives_gives_zero_f1() {
        let m = ClassificationMetrics::compute(&[1, 0, 0], &[0, 0, 0]).unwrap();
        assert_eq!(m.f1_score, 0.0);
        assert!((m.accuracy - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(ClassificationMetrics::compute(&[1, 0], &[1]).is_err());
        assert!(ClassificationMetrics::compute(&[], &[]).is_err());
    }
}
