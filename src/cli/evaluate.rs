//! Evaluator stage: score the saved model on the test partition

use std::path::Path;

use anyhow::Result;

use crate::pipeline::{
    extract_labels, load_dataset, ClassificationMetrics, ModelArtifact, PipelineConfig,
};
use crate::report::{display_metrics, write_metrics};
use crate::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_step_header,
    print_success,
};

/// Run the evaluator stage with the configuration at `config_path`
pub fn run_evaluate(config_path: &Path) -> Result<ClassificationMetrics> {
    let config = PipelineConfig::load(config_path)?;

    print_banner("Evaluate", env!("CARGO_PKG_VERSION"));

    print_step_header(1, "Load Test Data and Model");
    let test_df = load_dataset(&config.test_data_path)?;
    let artifact = ModelArtifact::load(&config.model_path)?;
    let labels = extract_labels(&test_df, &artifact.target_column)?;
    print_success(&format!(
        "Loaded {} test rows and model from {}",
        test_df.height(),
        artifact.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    print_step_header(2, "Predict");
    let spinner = create_spinner("Making predictions...");
    let predictions = artifact.predict(&test_df)?;
    finish_with_success(&spinner, &format!("{} predictions", predictions.len()));

    // All metrics are computed before anything is written
    let metrics = ClassificationMetrics::compute(&labels, &predictions)?;
    tracing::info!(
        accuracy = metrics.accuracy,
        f1_score = metrics.f1_score,
        "evaluation complete"
    );

    print_step_header(3, "Save Metrics");
    write_metrics(&metrics.record(), &config.metric_path)?;
    print_success(&format!("Metrics saved to {}", config.metric_path.display()));

    display_metrics(&metrics, labels.len());
    print_completion("Evaluation");
    Ok(metrics)
}
