//! Pipeline configuration shared by every stage

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Flat configuration record read once per stage invocation.
///
/// The six path/name keys are required. Everything else falls back to the
/// churn-modelling defaults so a minimal `config.json` keeps working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Raw customer dataset (CSV)
    pub data_path: PathBuf,
    /// Where the training partition is written
    pub train_data_path: PathBuf,
    /// Where the test partition is written
    pub test_data_path: PathBuf,
    /// Where the fitted pipeline artifact is written
    pub model_path: PathBuf,
    /// Where the evaluation metrics record is written
    pub metric_path: PathBuf,
    /// Repository name on the model registry (without the user prefix)
    pub hf_repo_name: String,

    /// Binary 0/1 label column
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Identifier columns removed before modeling
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
    /// Columns one-hot encoded by the preprocessor
    #[serde(default = "default_categorical_features")]
    pub categorical_features: Vec<String>,
    /// Columns standardized by the preprocessor
    #[serde(default = "default_numerical_features")]
    pub numerical_features: Vec<String>,
    /// Fraction of rows held out for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Seed for the stratified shuffle
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    /// Commit message attached to every registry upload
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

fn default_target_column() -> String {
    "Exited".to_string()
}

fn default_drop_columns() -> Vec<String> {
    to_strings(&["RowNumber", "CustomerId", "Surname"])
}

fn default_categorical_features() -> Vec<String> {
    to_strings(&["Geography", "Gender"])
}

fn default_numerical_features() -> Vec<String> {
    to_strings(&[
        "CreditScore",
        "Age",
        "Tenure",
        "Balance",
        "NumOfProducts",
        "HasCrCard",
        "IsActiveMember",
        "EstimatedSalary",
    ])
}

fn default_test_size() -> f64 {
    0.2
}

fn default_random_seed() -> u64 {
    42
}

fn default_commit_message() -> String {
    "Automatic deployment from GitHub Actions".to_string()
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl PipelineConfig {
    /// Load the configuration from a JSON file.
    ///
    /// Fails if the file is missing, is not valid JSON, or lacks a required key.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_json(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if !(config.test_size > 0.0 && config.test_size < 1.0) {
            anyhow::bail!(
                "test_size must be strictly between 0.0 and 1.0, got {}",
                config.test_size
            );
        }
        Ok(config)
    }

    /// All feature columns in the order the preprocessor emits them
    pub fn feature_columns(&self) -> Vec<String> {
        self.numerical_features
            .iter()
            .chain(self.categorical_features.iter())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "data_path": "data/raw/churn.csv",
        "train_data_path": "data/processed/train.csv",
        "test_data_path": "data/processed/test.csv",
        "model_path": "models/model.zip",
        "metric_path": "metrics/metrics.json",
        "hf_repo_name": "churn-model"
    }"#;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = PipelineConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config.target_column, "Exited");
        assert_eq!(config.drop_columns, vec!["RowNumber", "CustomerId", "Surname"]);
        assert_eq!(config.numerical_features.len(), 8);
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_seed, 42);
    }

    #[test]
    fn test_feature_columns_numeric_first() {
        let config = PipelineConfig::from_json(MINIMAL).unwrap();
        let features = config.feature_columns();
        assert_eq!(features.first().map(String::as_str), Some("CreditScore"));
        assert_eq!(features.last().map(String::as_str), Some("Gender"));
    }

    #[test]
    fn test_invalid_test_size_rejected() {
        let json = MINIMAL.replace(
            "\"hf_repo_name\": \"churn-model\"",
            "\"hf_repo_name\": \"churn-model\", \"test_size\": 1.5",
        );
        assert!(PipelineConfig::from_json(&json).is_err());
    }
}
