//! Terminal styling for stage output

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::PipelineConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static CLOUD: Emoji<'_, '_> = Emoji("☁️  ", "");

/// Print the stage banner
pub fn print_banner(stage: &str, version: &str) {
    println!();
    println!(
        "    {} {} {}",
        style("churnops").cyan().bold(),
        style("│").dim(),
        style(stage).white().bold()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
}

/// Print the configuration card shared by all stages
pub fn print_config(config: &PipelineConfig) {
    println!();
    println!("    {}", style("Configuration").cyan().bold());
    print_path_line(&FOLDER, "Data", &config.data_path);
    print_path_line(&SAVE, "Train split", &config.train_data_path);
    print_path_line(&SAVE, "Test split", &config.test_data_path);
    print_path_line(&SAVE, "Model", &config.model_path);
    print_path_line(&SAVE, "Metrics", &config.metric_path);
    println!(
        "      {}{:<12} {}",
        TARGET,
        "Target",
        style(&config.target_column).yellow()
    );
    println!(
        "      {}{:<12} {}",
        CLOUD,
        "Repository",
        style(&config.hf_repo_name).yellow()
    );
}

fn print_path_line(icon: &Emoji<'_, '_>, label: &str, path: &Path) {
    println!(
        "      {}{:<12} {}",
        icon,
        label,
        style(truncate_path(path, 44)).dim()
    );
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the final completion message
pub fn print_completion(stage: &str) {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style(format!("{} complete!", stage)).green().bold()
    );
    println!();
}

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    let chars: Vec<char> = path_str.chars().collect();
    if chars.len() <= max_len {
        path_str
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
