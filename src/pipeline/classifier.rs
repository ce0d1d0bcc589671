//! Class-weighted logistic regression
//!
//! Minimizes the weighted mean log-loss plus an L2 penalty on the
//! coefficients (the intercept is not penalized):
//!
//! `J(w, b) = (1/W) * sum_i s_i * logloss_i + ||w||^2 / (2 * C * W)`
//!
//! where `s_i` is the sample weight and `W = sum_i s_i`. This has the same
//! minimizer as the conventional `C * sum_i s_i * logloss_i + ||w||^2 / 2`.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::preprocess::FeatureMatrix;

/// How per-class sample weights are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every row weighs 1.0
    Uniform,
    /// `n_rows / (2 * n_class)`, so both classes contribute equally
    Balanced,
}

/// Training hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    pub c: f64,
    pub class_weight: ClassWeight,
    pub max_iter: usize,
    /// Stop once the largest gradient component falls below this
    pub tol: f64,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            c: 1.0,
            class_weight: ClassWeight::Balanced,
            max_iter: 5_000,
            tol: 1e-4,
        }
    }
}

/// Trained linear decision function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedClassifier {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Gradient steps taken during training
    pub iterations: usize,
    pub converged: bool,
}

/// Numerically stable logistic function
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl LogisticRegression {
    /// Per-row sample weights for the configured class weighting
    pub fn sample_weights(&self, labels: &[u8]) -> Result<Vec<f64>> {
        let positives = labels.iter().filter(|&&y| y == 1).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            anyhow::bail!(
                "Training data needs samples of both classes (found {} negative, {} positive)",
                negatives,
                positives
            );
        }

        Ok(match self.class_weight {
            ClassWeight::Uniform => vec![1.0; labels.len()],
            ClassWeight::Balanced => {
                let n = labels.len() as f64;
                let w_pos = n / (2.0 * positives as f64);
                let w_neg = n / (2.0 * negatives as f64);
                labels
                    .iter()
                    .map(|&y| if y == 1 { w_pos } else { w_neg })
                    .collect()
            }
        })
    }

    /// Fit by full-batch gradient descent with a fixed step of `1 / L`, where
    /// `L` bounds the Lipschitz constant of the gradient.
    pub fn fit(&self, x: &FeatureMatrix, labels: &[u8]) -> Result<FittedClassifier> {
        if x.n_rows() != labels.len() {
            anyhow::bail!(
                "Feature rows ({}) and labels ({}) differ in length",
                x.n_rows(),
                labels.len()
            );
        }
        if self.c <= 0.0 {
            anyhow::bail!("Regularization strength C must be positive, got {}", self.c);
        }

        let weights = self.sample_weights(labels)?;
        let total_weight: f64 = weights.iter().sum();
        let penalty = 1.0 / (self.c * total_weight);

        // Row norm includes the implicit intercept column
        let max_sq_norm = x
            .rows()
            .map(|row| 1.0 + row.iter().map(|v| v * v).sum::<f64>())
            .fold(0.0, f64::max);
        let lipschitz = 0.25 * max_sq_norm + penalty;
        let step = 1.0 / lipschitz;

        let n_cols = x.n_cols();
        let mut coefficients = vec![0.0; n_cols];
        let mut intercept = 0.0;
        let mut grad = vec![0.0; n_cols];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            grad.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_intercept = 0.0;

            for ((row, &y), &w) in x.rows().zip(labels).zip(&weights) {
                let z = intercept + dot(&coefficients, row);
                let residual = w * (sigmoid(z) - f64::from(y));
                grad_intercept += residual;
                for (g, v) in grad.iter_mut().zip(row) {
                    *g += residual * v;
                }
            }

            grad_intercept /= total_weight;
            for (g, c) in grad.iter_mut().zip(&coefficients) {
                *g = *g / total_weight + penalty * c;
            }

            let max_grad = grad
                .iter()
                .map(|g| g.abs())
                .fold(grad_intercept.abs(), f64::max);
            if max_grad < self.tol {
                converged = true;
                break;
            }

            intercept -= step * grad_intercept;
            for (c, g) in coefficients.iter_mut().zip(&grad) {
                *c -= step * g;
            }
            iterations += 1;
        }

        if !converged {
            tracing::warn!(
                max_iter = self.max_iter,
                "logistic regression did not converge; using last iterate"
            );
        }
        tracing::info!(iterations, converged, "fitted logistic regression");

        Ok(FittedClassifier {
            coefficients,
            intercept,
            iterations,
            converged,
        })
    }
}

impl FittedClassifier {
    pub fn decision_function(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        if x.n_cols() != self.coefficients.len() {
            anyhow::bail!(
                "Classifier expects {} features, got {}",
                self.coefficients.len(),
                x.n_cols()
            );
        }
        Ok(x
            .rows()
            .map(|row| self.intercept + dot(&self.coefficients, row))
            .collect())
    }

    /// Probability of the positive class per row
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<f64>> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(sigmoid)
            .collect())
    }

    /// Hard labels: positive when the decision value is above zero
    pub fn predict(&self, x: &FeatureMatrix) -> Result<Vec<u8>> {
        Ok(self
            .decision_function(x)?
            .into_iter()
            .map(|z| u8::from(z > 0.0))
            .collect())
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
