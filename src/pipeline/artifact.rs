//! Persisted pipeline artifact: preprocessor + classifier as one unit
//!
//! On disk the artifact is a deflate-compressed zip archive with a single
//! `pipeline.json` entry.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::classifier::FittedClassifier;
use super::loader::ensure_parent_dir;
use super::preprocess::Preprocessor;

/// Name of the JSON entry inside the archive
const PIPELINE_ENTRY: &str = "pipeline.json";

/// Bumped whenever the serialized layout changes incompatibly
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Fitted preprocessing transform and classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Version of churnops that wrote the artifact
    pub churnops_version: String,
    pub created_at: DateTime<Utc>,
    pub target_column: String,
    pub preprocessor: Preprocessor,
    pub classifier: FittedClassifier,
}

impl ModelArtifact {
    pub fn new(
        target_column: &str,
        preprocessor: Preprocessor,
        classifier: FittedClassifier,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            churnops_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            target_column: target_column.to_string(),
            preprocessor,
            classifier,
        }
    }

    /// Predict a label for every row of `df`. Extra columns are ignored.
    pub fn predict(&self, df: &DataFrame) -> Result<Vec<u8>> {
        let features = self.preprocessor.transform(df)?;
        self.classifier.predict(&features)
    }

    /// Positive-class probability for every row of `df`
    pub fn predict_proba(&self, df: &DataFrame) -> Result<Vec<f64>> {
        let features = self.preprocessor.transform(df)?;
        self.classifier.predict_proba(&features)
    }

    /// Write the artifact, replacing any existing file at `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let json = serde_json::to_vec_pretty(self).context("Failed to serialize pipeline")?;

        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create model file: {}", path.display()))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(0o644);

        zip.start_file(PIPELINE_ENTRY, options)
            .with_context(|| format!("Failed to add {} to model archive", PIPELINE_ENTRY))?;
        zip.write_all(&json)?;
        zip.finish().context("Failed to finalize model archive")?;

        tracing::info!(path = %path.display(), bytes = json.len(), "saved model artifact");
        Ok(())
    }

    /// Read an artifact written by [`ModelArtifact::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Model file not found: {}", path.display()))?;
        let mut archive = ZipArchive::new(file)
            .with_context(|| format!("Not a model archive: {}", path.display()))?;
        let entry = archive
            .by_name(PIPELINE_ENTRY)
            .with_context(|| format!("Model archive has no {}", PIPELINE_ENTRY))?;

        let artifact: Self = serde_json::from_reader(entry)
            .with_context(|| format!("Failed to parse model archive: {}", path.display()))?;

        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            anyhow::bail!(
                "Unsupported model format version {} (expected {})",
                artifact.format_version,
                ARTIFACT_FORMAT_VERSION
            );
        }

        tracing::info!(
            path = %path.display(),
            created_at = %artifact.created_at,
            "loaded model artifact"
        );
        Ok(artifact)
    }
}
