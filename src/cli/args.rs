//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::DEFAULT_CONFIG_PATH;

/// churnops - Train, evaluate and publish a customer churn classifier
#[derive(Parser, Debug)]
#[command(name = "churnops")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (JSON)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Split the raw dataset, fit the pipeline and save the model artifact
    Train,

    /// Score the saved model on the test split and write the metrics record
    Evaluate,

    /// Upload the project folder to the model registry.
    /// Requires HF_USERNAME and HF_TOKEN in the environment.
    Publish {
        /// Folder uploaded as the repository content
        #[arg(long, default_value = ".")]
        folder: PathBuf,
    },
}
