//! CLI module - argument parsing and the three stage runners

mod args;
pub mod evaluate;
pub mod publish;
pub mod train;

pub use args::{Cli, Commands};
pub use evaluate::run_evaluate;
pub use publish::{publish_with, run_publish};
pub use train::run_train;
