//! Column-wise feature preprocessing
//!
//! Numerical columns are standardized, categorical columns one-hot encoded.
//! Both are fit on the training partition only and replayed unchanged on any
//! later frame.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Dense row-major feature matrix
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Build a matrix from row-major values; `data.len()` must equal `n_rows * n_cols`
    pub fn from_row_major(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Result<Self> {
        if n_cols == 0 {
            anyhow::bail!("Feature matrix needs at least one column");
        }
        if data.len() != n_rows * n_cols {
            anyhow::bail!(
                "Feature matrix shape mismatch: {} values for {} x {}",
                data.len(),
                n_rows,
                n_cols
            );
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_cols)
    }
}

/// Standardizes one numerical column: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation, or 1.0 for a constant column
    pub scale: f64,
}

impl StandardScaler {
    pub fn fit(column: &str, values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            anyhow::bail!("Cannot fit scaler on empty column '{}'", column);
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();
        let scale = if std > 0.0 && std.is_finite() { std } else { 1.0 };

        Ok(Self {
            column: column.to_string(),
            mean,
            scale,
        })
    }

    pub fn transform_value(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}

/// One-hot encodes one categorical column over the categories seen in training.
///
/// Unknown or null values encode to an all-zero block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub column: String,
    /// Sorted training categories; position is the output slot
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit(column: &str, values: &[Option<String>]) -> Result<Self> {
        let categories: Vec<String> = values
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if categories.is_empty() {
            anyhow::bail!("Categorical column '{}' has no non-null values", column);
        }

        Ok(Self {
            column: column.to_string(),
            categories,
        })
    }

    /// Slot index of a category, `None` when it was not seen in training
    pub fn slot(&self, value: Option<&str>) -> Option<usize> {
        value.and_then(|v| {
            self.categories
                .binary_search_by(|c| c.as_str().cmp(v))
                .ok()
        })
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }
}

/// Fitted column transformer: scaled numerical block then one-hot blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub numerical: Vec<StandardScaler>,
    pub categorical: Vec<OneHotEncoder>,
}

impl Preprocessor {
    /// Fit scalers and encoders on a (training) frame
    pub fn fit(df: &DataFrame, numerical: &[String], categorical: &[String]) -> Result<Self> {
        if numerical.is_empty() && categorical.is_empty() {
            anyhow::bail!("No feature columns configured");
        }

        let numerical = numerical
            .iter()
            .map(|name| StandardScaler::fit(name, &numeric_values(df, name)?))
            .collect::<Result<Vec<_>>>()?;

        let categorical = categorical
            .iter()
            .map(|name| OneHotEncoder::fit(name, &categorical_values(df, name)?))
            .collect::<Result<Vec<_>>>()?;

        let fitted = Self {
            numerical,
            categorical,
        };
        tracing::debug!(features = fitted.n_features(), "fitted preprocessor");
        Ok(fitted)
    }

    /// Width of the encoded feature vector
    pub fn n_features(&self) -> usize {
        self.numerical.len() + self.categorical.iter().map(OneHotEncoder::width).sum::<usize>()
    }

    /// Output column names, e.g. `Age` or `Geography=France`
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numerical.iter().map(|s| s.column.clone()).collect();
        for encoder in &self.categorical {
            for category in &encoder.categories {
                names.push(format!("{}={}", encoder.column, category));
            }
        }
        names
    }

    /// Encode a frame into a dense feature matrix
    pub fn transform(&self, df: &DataFrame) -> Result<FeatureMatrix> {
        let n_rows = df.height();
        let n_cols = self.n_features();
        let mut data = vec![0.0; n_rows * n_cols];

        for (j, scaler) in self.numerical.iter().enumerate() {
            let values = numeric_values(df, &scaler.column)?;
            for (i, value) in values.into_iter().enumerate() {
                data[i * n_cols + j] = scaler.transform_value(value);
            }
        }

        let mut offset = self.numerical.len();
        for encoder in &self.categorical {
            let values = categorical_values(df, &encoder.column)?;
            let mut unknown = 0usize;
            for (i, value) in values.iter().enumerate() {
                match encoder.slot(value.as_deref()) {
                    Some(slot) => data[i * n_cols + offset + slot] = 1.0,
                    None => unknown += 1,
                }
            }
            if unknown > 0 {
                tracing::debug!(
                    column = %encoder.column,
                    rows = unknown,
                    "unknown categories encoded as all zeros"
                );
            }
            offset += encoder.width();
        }

        FeatureMatrix::from_row_major(data, n_rows, n_cols)
    }
}

/// Read a numerical column as `f64`, failing on nulls or non-numeric values
fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .with_context(|| format!("Numerical column '{}' not found", name))?;

    if !column.dtype().is_primitive_numeric() && column.dtype() != &DataType::Boolean {
        anyhow::bail!(
            "Numerical column '{}' has non-numeric type {}",
            name,
            column.dtype()
        );
    }

    let float_col = column.cast(&DataType::Float64)?;
    float_col
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(anyhow::anyhow!(
                "Numerical column '{}' has a missing or non-finite value at row {}",
                name,
                row
            )),
        })
        .collect()
}

/// Read a categorical column as optional strings, whatever its storage type
fn categorical_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .with_context(|| format!("Categorical column '{}' not found", name))?;

    let string_col = column.cast(&DataType::String)?;
    Ok(string_col
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}
