//! Metrics record export

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::{ensure_parent_dir, MetricsRecord};

/// Write the metrics record as JSON, replacing any previous content.
///
/// The record is serialized in full before the file is touched, so a failure
/// never leaves a partial record behind.
pub fn write_metrics(record: &MetricsRecord, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("Failed to serialize metrics")?;
    ensure_parent_dir(path)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write metrics file: {}", path.display()))?;

    tracing::info!(path = %path.display(), "saved metrics");
    Ok(())
}
