//! Stage summary tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{ClassBalance, ClassificationMetrics};

/// What the trainer did, for the end-of-stage table
#[derive(Debug, Default)]
pub struct TrainingSummary {
    pub source_rows: usize,
    pub dropped_columns: Vec<String>,
    pub train_balance: ClassBalance,
    pub test_balance: ClassBalance,
    pub encoded_features: usize,
    pub iterations: usize,
    pub converged: bool,
    pub train_accuracy: f64,
}

impl TrainingSummary {
    pub fn new(source_rows: usize) -> Self {
        Self {
            source_rows,
            ..Default::default()
        }
    }

    pub fn display(&self) {
        print_section_title("📋", "TRAINING SUMMARY");

        let mut table = new_table();
        table.add_row(vec![Cell::new("📁 Source Rows"), Cell::new(self.source_rows)]);
        table.add_row(vec![
            Cell::new("🗑️  Identifier Columns Dropped"),
            Cell::new(self.dropped_columns.len()),
        ]);
        table.add_row(vec![
            Cell::new("🏋️  Train Rows"),
            Cell::new(format_balance(&self.train_balance)),
        ]);
        table.add_row(vec![
            Cell::new("🧪 Test Rows"),
            Cell::new(format_balance(&self.test_balance)),
        ]);
        table.add_row(vec![
            Cell::new("🔢 Encoded Features"),
            Cell::new(self.encoded_features),
        ]);
        table.add_row(vec![
            Cell::new("🔁 Optimizer Iterations"),
            Cell::new(self.iterations).fg(if self.converged {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("✅ Train Accuracy"),
            Cell::new(format!("{:.4}", self.train_accuracy))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        print_indented(&table);
    }
}

/// Metrics table printed by the evaluator
pub fn display_metrics(metrics: &ClassificationMetrics, test_rows: usize) {
    print_section_title("📈", "EVALUATION SUMMARY");

    let mut table = new_table();
    table.add_row(vec![Cell::new("🧪 Test Rows"), Cell::new(test_rows)]);
    table.add_row(vec![
        Cell::new("🎯 Accuracy"),
        Cell::new(format!("{:.4}", metrics.accuracy))
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("⚖️  F1 Score"),
        Cell::new(format!("{:.4}", metrics.f1_score))
            .fg(score_color(metrics.f1_score))
            .add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec![
        Cell::new("Precision"),
        Cell::new(format!("{:.4}", metrics.precision)),
    ]);
    table.add_row(vec![
        Cell::new("Recall"),
        Cell::new(format!("{:.4}", metrics.recall)),
    ]);
    print_indented(&table);

    let cm = &metrics.confusion;
    let mut matrix = Table::new();
    matrix.load_preset(UTF8_FULL_CONDENSED);
    matrix.set_header(vec![
        Cell::new(""),
        Cell::new("Predicted 0").add_attribute(Attribute::Bold),
        Cell::new("Predicted 1").add_attribute(Attribute::Bold),
    ]);
    matrix.add_row(vec![
        Cell::new("Actual 0").add_attribute(Attribute::Bold),
        Cell::new(cm.true_negatives),
        Cell::new(cm.false_positives).fg(Color::Red),
    ]);
    matrix.add_row(vec![
        Cell::new("Actual 1").add_attribute(Attribute::Bold),
        Cell::new(cm.false_negatives).fg(Color::Red),
        Cell::new(cm.true_positives),
    ]);
    println!();
    print_indented(&matrix);
}

fn format_balance(balance: &ClassBalance) -> String {
    format!(
        "{} ({} churned, {:.1}%)",
        balance.total(),
        balance.positives,
        balance.positive_rate() * 100.0
    )
}

fn score_color(score: f64) -> Color {
    if score > 0.6 {
        Color::Green
    } else if score > 0.4 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    table
}

fn print_section_title(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
