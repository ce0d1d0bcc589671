//! Pipeline module - data handling, model fitting and scoring

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod loader;
pub mod metrics;
pub mod preprocess;
pub mod split;
pub mod target;

pub use artifact::*;
pub use classifier::*;
pub use config::*;
pub use loader::*;
pub use metrics::*;
pub use preprocess::*;
pub use split::*;
pub use target::*;
