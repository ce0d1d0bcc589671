//! churnops: Customer Churn Model Pipeline
//!
//! Three stages that hand off through the filesystem: train a class-balanced
//! logistic regression on a stratified split, evaluate it on the held-out
//! partition, and publish the project folder to a model registry.

pub mod cli;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod utils;
