//! Dataset loading and persistence for CSV files

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

/// Number of rows polars scans to infer column types
const INFER_SCHEMA_LENGTH: usize = 10_000;

/// Load a CSV dataset into memory.
///
/// Fails on a missing file, an extension other than `.csv`, or a file polars
/// cannot parse.
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    check_csv_extension(path)?;
    if !path.is_file() {
        anyhow::bail!("Dataset not found: {}", path.display());
    }

    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(INFER_SCHEMA_LENGTH))
        .finish()
        .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?;

    let (rows, cols) = df.shape();
    tracing::info!(path = %path.display(), rows, cols, "loaded dataset");
    Ok(df)
}

/// Write a dataset as CSV with a header row, creating parent directories
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    check_csv_extension(path)?;
    ensure_parent_dir(path)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = df.height(), "saved dataset");
    Ok(())
}

/// Column names of a DataFrame as owned strings
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

/// Fail with the list of available columns if any of `required` is absent
pub fn require_columns(df: &DataFrame, required: &[String]) -> Result<()> {
    let available = column_names(df);
    let missing: Vec<&String> = required
        .iter()
        .filter(|name| !available.contains(name))
        .collect();

    if !missing.is_empty() {
        anyhow::bail!(
            "Column(s) {:?} not found in dataset. Available columns: {:?}",
            missing,
            available
        );
    }
    Ok(())
}

/// Remove identifier columns before modeling.
///
/// Every listed column must be present: a dataset without its identifier
/// columns is not the dataset the configuration describes.
pub fn drop_identifier_columns(df: DataFrame, columns: &[String]) -> Result<DataFrame> {
    require_columns(&df, columns).context("Cannot drop identifier columns")?;
    Ok(df.drop_many(columns.iter().map(|s| s.as_str())))
}

/// Create the parent directory of `path` if it does not exist yet
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn check_csv_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension != "csv" {
        anyhow::bail!(
            "Unsupported file format: '{}' ({}). Supported formats: csv",
            extension,
            path.display()
        );
    }
    Ok(())
}
