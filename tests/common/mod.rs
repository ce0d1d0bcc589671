//! Shared test utilities and fixture generators

#![allow(dead_code)]

use churnops::pipeline::MetricsRecord;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const GEOGRAPHIES: [&str; 3] = ["France", "Germany", "Spain"];

/// Create a synthetic churn dataset shaped like the bank customer data
///
/// Churn probability rises with age, for German customers, inactive members
/// and customers holding 3+ products, giving roughly a 20% positive rate.
pub fn create_churn_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut row_number = Vec::with_capacity(rows);
    let mut customer_id = Vec::with_capacity(rows);
    let mut surname = Vec::with_capacity(rows);
    let mut credit_score = Vec::with_capacity(rows);
    let mut geography = Vec::with_capacity(rows);
    let mut gender = Vec::with_capacity(rows);
    let mut age = Vec::with_capacity(rows);
    let mut tenure = Vec::with_capacity(rows);
    let mut balance = Vec::with_capacity(rows);
    let mut products = Vec::with_capacity(rows);
    let mut has_card = Vec::with_capacity(rows);
    let mut active = Vec::with_capacity(rows);
    let mut salary = Vec::with_capacity(rows);
    let mut exited = Vec::with_capacity(rows);

    for i in 0..rows {
        let geo = GEOGRAPHIES[rng.gen_range(0..GEOGRAPHIES.len())];
        let female = rng.gen_bool(0.45);
        let a: i64 = rng.gen_range(18..=80);
        let n_products: i64 = rng.gen_range(1..=4);
        let is_active: i64 = i64::from(rng.gen_bool(0.5));

        let z = -2.0 + 0.08 * (a - 40) as f64
            + if geo == "Germany" { 1.0 } else { 0.0 }
            - 1.0 * is_active as f64
            + if female { 0.4 } else { 0.0 }
            + if n_products >= 3 { 1.5 } else { 0.0 };
        let p = 1.0 / (1.0 + (-z).exp());

        row_number.push(i as i64 + 1);
        customer_id.push(15_600_000 + i as i64);
        surname.push(format!("Customer{}", i));
        credit_score.push(rng.gen_range(350i64..=850));
        geography.push(geo.to_string());
        gender.push(if female { "Female" } else { "Male" }.to_string());
        age.push(a);
        tenure.push(rng.gen_range(0i64..=10));
        balance.push(if rng.gen_bool(0.35) {
            0.0
        } else {
            rng.gen_range(50_000.0..200_000.0)
        });
        products.push(n_products);
        has_card.push(i64::from(rng.gen_bool(0.7)));
        active.push(is_active);
        salary.push(rng.gen_range(10_000.0..200_000.0));
        exited.push(i64::from(rng.gen::<f64>() < p));
    }

    DataFrame::new(vec![
        Column::new("RowNumber".into(), row_number),
        Column::new("CustomerId".into(), customer_id),
        Column::new("Surname".into(), surname),
        Column::new("CreditScore".into(), credit_score),
        Column::new("Geography".into(), geography),
        Column::new("Gender".into(), gender),
        Column::new("Age".into(), age),
        Column::new("Tenure".into(), tenure),
        Column::new("Balance".into(), balance),
        Column::new("NumOfProducts".into(), products),
        Column::new("HasCrCard".into(), has_card),
        Column::new("IsActiveMember".into(), active),
        Column::new("EstimatedSalary".into(), salary),
        Column::new("Exited".into(), exited),
    ])
    .unwrap()
}

/// Write a DataFrame as CSV inside `dir`
pub fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Read a CSV written by a test or a stage
pub fn read_csv(path: &Path) -> DataFrame {
    LazyCsvReader::new(path).finish().unwrap().collect().unwrap()
}

/// Scratch workspace with a raw churn CSV and a config.json pointing into it.
///
/// Output paths sit in subdirectories that do not exist yet, so stages must
/// create them.
pub struct Workspace {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl Workspace {
    pub fn new(rows: usize, seed: u64) -> Self {
        let dir = TempDir::new().unwrap();
        let raw_dir = dir.path().join("data").join("raw");
        std::fs::create_dir_all(&raw_dir).unwrap();
        let mut df = create_churn_dataframe(rows, seed);
        let data_path = write_csv(&raw_dir, "churn.csv", &mut df);

        let root = dir.path();
        let config = serde_json::json!({
            "data_path": data_path,
            "train_data_path": root.join("data/processed/train.csv"),
            "test_data_path": root.join("data/processed/test.csv"),
            "model_path": root.join("models/model.zip"),
            "metric_path": root.join("metrics/metrics.json"),
            "hf_repo_name": "churn-model",
        });
        let config_path = root.join("config.json");
        std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        Self { dir, config_path }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

/// Extract the binary label column of a frame as u8
pub fn labels_of(df: &DataFrame, target: &str) -> Vec<u8> {
    df.column(target)
        .unwrap()
        .cast(&DataType::Int64)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap() as u8)
        .collect()
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Read a metrics JSON file back into a record
pub fn read_metrics(path: &Path) -> MetricsRecord {
    let contents = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}
