//! Publisher stage: push the project folder to the model registry

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::pipeline::PipelineConfig;
use crate::registry::{endpoint_from_env, publish_folder, Credentials, PublishReport, RepoStatus};
use crate::utils::{print_banner, print_completion, print_info, print_step_header, print_success};

/// Run the publisher stage with the configuration at `config_path`.
///
/// Credentials come from `HF_USERNAME` / `HF_TOKEN`; both are checked before
/// any request is made.
pub fn run_publish(config_path: &Path, folder: &Path) -> Result<PublishReport> {
    let config = PipelineConfig::load(config_path)?;
    let credentials = Credentials::from_env()?;
    publish_with(&config, &credentials, &endpoint_from_env(), folder)
}

/// Publish with explicit credentials and registry endpoint
pub fn publish_with(
    config: &PipelineConfig,
    credentials: &Credentials,
    endpoint: &str,
    folder: &Path,
) -> Result<PublishReport> {
    print_banner("Publish", env!("CARGO_PKG_VERSION"));

    let repo_id = credentials.repo_id(&config.hf_repo_name);
    print_step_header(1, "Upload to Registry");
    print_info(&format!(
        "Uploading {} to {} ({})",
        style(folder.display()).dim(),
        style(&repo_id).yellow(),
        endpoint
    ));

    let report = publish_folder(
        endpoint,
        credentials,
        &config.hf_repo_name,
        folder,
        &config.commit_message,
    )
    .with_context(|| format!("Deployment of {} failed", repo_id))?;

    match report.repo_status {
        RepoStatus::Created => print_success(&format!("Repo {} created", report.repo_id)),
        RepoStatus::AlreadyExists => print_info(&format!("Repo {} already exists", report.repo_id)),
    }
    print_success(&format!(
        "Uploaded {} file(s), {} through the large-file store",
        report.files_uploaded, report.lfs_files
    ));
    if report.files_ignored > 0 {
        print_info(&format!("Registry ignored {} file(s)", report.files_ignored));
    }
    if let Some(url) = &report.commit_url {
        print_info(&format!("Commit: {}", url));
    }

    print_completion("Deployment");
    Ok(report)
}
