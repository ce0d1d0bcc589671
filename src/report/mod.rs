//! Report module - stage summaries and the persisted metrics record

pub mod metrics_export;
pub mod summary;

pub use metrics_export::*;
pub use summary::*;
