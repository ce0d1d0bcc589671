//! Binary label extraction
//!
//! The label column must already hold 0/1 values. Anything else (nulls,
//! strings, a third class) is treated as malformed input.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Count of rows per class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassBalance {
    pub negatives: usize,
    pub positives: usize,
}

impl ClassBalance {
    pub fn from_labels(labels: &[u8]) -> Self {
        let positives = labels.iter().filter(|&&y| y == 1).count();
        Self {
            negatives: labels.len() - positives,
            positives,
        }
    }

    pub fn total(&self) -> usize {
        self.negatives + self.positives
    }

    /// Fraction of positive rows, 0.0 for an empty set
    pub fn positive_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.positives as f64 / self.total() as f64
        }
    }

    /// Label of the more frequent class (0 on a tie)
    pub fn majority_label(&self) -> u8 {
        if self.positives > self.negatives {
            1
        } else {
            0
        }
    }
}

/// Extract the binary label column as one `u8` per row
///
/// # Arguments
/// * `df` - Reference to the DataFrame
/// * `target` - Name of the label column
///
/// # Errors
/// The column is missing, non-numeric, contains nulls, or holds a value
/// other than 0 or 1.
pub fn extract_labels(df: &DataFrame, target: &str) -> Result<Vec<u8>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if target_col.len() == 0 {
        anyhow::bail!("Target column '{}' is empty", target);
    }

    if !target_col.dtype().is_primitive_numeric() && target_col.dtype() != &DataType::Boolean {
        anyhow::bail!(
            "Target column '{}' must be binary 0/1, found type {}",
            target,
            target_col.dtype()
        );
    }

    let null_count = target_col.null_count();
    if null_count > 0 {
        anyhow::bail!(
            "Target column '{}' contains {} null value(s)",
            target,
            null_count
        );
    }

    let float_col = target_col.cast(&DataType::Float64)?;
    let mut labels = Vec::with_capacity(float_col.len());
    for value in float_col.f64()?.into_iter().flatten() {
        if (value - 0.0).abs() < TOLERANCE {
            labels.push(0);
        } else if (value - 1.0).abs() < TOLERANCE {
            labels.push(1);
        } else {
            anyhow::bail!(
                "Target column '{}' must be binary 0/1, found value {}",
                target,
                value
            );
        }
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_integer_labels() {
        let df = df! { "y" => [0i64, 1, 1, 0] }.unwrap();
        assert_eq!(extract_labels(&df, "y").unwrap(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_non_binary_rejected() {
        let df = df! { "y" => [0i64, 1, 2] }.unwrap();
        let err = extract_labels(&df, "y").unwrap_err().to_string();
        assert!(err.contains("binary"), "{}", err);
    }

    #[test]
    fn test_string_labels_rejected() {
        let df = df! { "y" => ["yes", "no"] }.unwrap();
        assert!(extract_labels(&df, "y").is_err());
    }

    #[test]
    fn test_nulls_rejected() {
        let df = df! { "y" => [Some(0i32), None, Some(1)] }.unwrap();
        assert!(extract_labels(&df, "y").is_err());
    }

    #[test]
    fn test_class_balance() {
        let balance = ClassBalance::from_labels(&[0, 0, 0, 1]);
        assert_eq!(balance.negatives, 3);
        assert_eq!(balance.positives, 1);
        assert_eq!(balance.majority_label(), 0);
        assert!((balance.positive_rate() - 0.25).abs() < 1e-12);
    }
}
