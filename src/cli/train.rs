//! Trainer stage: split, fit and persist

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::{
    drop_identifier_columns, extract_labels, load_dataset, require_columns, save_dataset,
    split_dataframe, stratified_split, ClassBalance, ClassificationMetrics, LogisticRegression,
    ModelArtifact, PipelineConfig, Preprocessor,
};
use crate::report::TrainingSummary;
use crate::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_info, print_step_header, print_success,
};

/// Run the trainer stage with the configuration at `config_path`
pub fn run_train(config_path: &Path) -> Result<TrainingSummary> {
    let config = PipelineConfig::load(config_path)?;

    print_banner("Train", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // Step 1: Load and clean
    print_step_header(1, "Load Dataset");
    let spinner = create_spinner("Reading CSV...");
    let raw = load_dataset(&config.data_path)?;
    finish_with_success(&spinner, &format!("Loaded {} rows", raw.height()));

    let mut summary = TrainingSummary::new(raw.height());
    let df = drop_identifier_columns(raw, &config.drop_columns)?;
    summary.dropped_columns = config.drop_columns.clone();
    if !config.drop_columns.is_empty() {
        print_info(&format!(
            "Dropped identifier columns: {}",
            config.drop_columns.join(", ")
        ));
    }

    require_columns(&df, &config.feature_columns()).context("Configured feature columns")?;
    let labels = extract_labels(&df, &config.target_column)?;

    // Step 2: Stratified split
    print_step_header(2, "Stratified Split");
    let split = stratified_split(&labels, config.test_size, config.random_seed)?;
    let (mut train_df, mut test_df) = split_dataframe(&df, &split)?;
    let train_labels: Vec<u8> = split.train.iter().map(|&i| labels[i]).collect();
    summary.train_balance = ClassBalance::from_labels(&train_labels);
    let test_labels: Vec<u8> = split.test.iter().map(|&i| labels[i]).collect();
    summary.test_balance = ClassBalance::from_labels(&test_labels);

    save_dataset(&mut train_df, &config.train_data_path)?;
    save_dataset(&mut test_df, &config.test_data_path)?;
    print_success(&format!(
        "Saved {} train / {} test rows (seed {})",
        train_df.height(),
        test_df.height(),
        config.random_seed
    ));

    // Step 3: Fit preprocessing + classifier on the training partition only
    print_step_header(3, "Fit Pipeline");
    let spinner = create_spinner("Training logistic regression...");
    let preprocessor = Preprocessor::fit(
        &train_df,
        &config.numerical_features,
        &config.categorical_features,
    )?;
    let features = preprocessor.transform(&train_df)?;
    let classifier = LogisticRegression::default().fit(&features, &train_labels)?;
    finish_with_success(&spinner, "Model training complete");

    summary.encoded_features = preprocessor.n_features();
    summary.iterations = classifier.iterations;
    summary.converged = classifier.converged;
    let train_predictions = classifier.predict(&features)?;
    summary.train_accuracy =
        ClassificationMetrics::compute(&train_labels, &train_predictions)?.accuracy;

    // Step 4: Persist
    print_step_header(4, "Save Model");
    let artifact = ModelArtifact::new(&config.target_column, preprocessor, classifier);
    artifact.save(&config.model_path)?;
    print_success(&format!("Model saved to {}", config.model_path.display()));

    summary.display();
    print_completion("Training");
    Ok(summary)
}
