//! Stratified, seeded train/test partitioning

use anyhow::Result;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of test rows for a dataset of `n_rows`: `ceil(n_rows * test_size)`
pub fn test_partition_size(n_rows: usize, test_size: f64) -> usize {
    (n_rows as f64 * test_size).ceil() as usize
}

/// Split row indices into train and test sets, preserving label proportions.
///
/// Per-class test counts are the floor of each class's proportional share; the
/// rows left over go to the classes with the largest remainders (lower label
/// first on ties). Within each class rows are drawn after a seeded shuffle, so
/// the same labels and seed always give the same partition.
///
/// # Arguments
/// * `labels` - Binary label per row
/// * `test_size` - Fraction of rows held out, strictly between 0 and 1
/// * `seed` - Seed for the shuffle
pub fn stratified_split(labels: &[u8], test_size: f64, seed: u64) -> Result<SplitIndices> {
    let n_rows = labels.len();
    if !(test_size > 0.0 && test_size < 1.0) {
        anyhow::bail!("test_size must be strictly between 0.0 and 1.0, got {}", test_size);
    }

    let n_test = test_partition_size(n_rows, test_size);
    if n_test == 0 || n_test >= n_rows {
        anyhow::bail!(
            "Cannot split {} row(s) with test_size {}: both partitions need at least one row",
            n_rows,
            test_size
        );
    }

    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (row, &label) in labels.iter().enumerate() {
        by_class[usize::from(label.min(1))].push(row);
    }

    check_class_sizes(&by_class, n_test, n_rows)?;

    let allocation = allocate_test_rows(&[by_class[0].len(), by_class[1].len()], n_test, n_rows);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_rows - n_test);
    let mut test = Vec::with_capacity(n_test);

    for (rows, &take) in by_class.iter_mut().zip(allocation.iter()) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..take]);
        train.extend_from_slice(&rows[take..]);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    tracing::debug!(
        train = train.len(),
        test = test.len(),
        seed,
        "stratified split computed"
    );

    Ok(SplitIndices { train, test })
}

/// Every present class needs two members, and each partition needs at least
/// one row per present class, for both sides to be able to carry every label
fn check_class_sizes(by_class: &[Vec<usize>; 2], n_test: usize, n_rows: usize) -> Result<()> {
    for (label, rows) in by_class.iter().enumerate() {
        if rows.len() == 1 {
            anyhow::bail!(
                "Class {} has only 1 row; stratified splitting needs at least 2 rows per class",
                label
            );
        }
    }

    let n_classes = by_class.iter().filter(|rows| !rows.is_empty()).count();
    let n_train = n_rows - n_test;
    if n_test < n_classes || n_train < n_classes {
        anyhow::bail!(
            "Cannot split {} row(s) into {} train / {} test: each partition needs {} rows (one per class)",
            n_rows,
            n_train,
            n_test,
            n_classes
        );
    }
    Ok(())
}

/// Distribute `n_test` rows across classes in proportion to their sizes
fn allocate_test_rows(class_sizes: &[usize; 2], n_test: usize, n_rows: usize) -> [usize; 2] {
    let mut counts = [0usize; 2];
    let mut remainders = [0usize; 2];

    for (class, &size) in class_sizes.iter().enumerate() {
        let share = size * n_test;
        counts[class] = share / n_rows;
        remainders[class] = share % n_rows;
    }

    let mut left = n_test - counts.iter().sum::<usize>();
    let mut order = [0usize, 1];
    // Stable sort keeps the lower label first on equal remainders
    order.sort_by(|&a, &b| remainders[b].cmp(&remainders[a]));
    for class in order {
        if left == 0 {
            break;
        }
        if counts[class] < class_sizes[class] {
            counts[class] += 1;
            left -= 1;
        }
    }

    counts
}

/// Materialize the two partitions as DataFrames
pub fn split_dataframe(df: &DataFrame, split: &SplitIndices) -> Result<(DataFrame, DataFrame)> {
    let train = take_rows(df, &split.train)?;
    let test = take_rows(df, &split.test)?;
    Ok((train, test))
}

fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx: Vec<IdxSize> = rows.iter().map(|&r| r as IdxSize).collect();
    let idx = IdxCa::from_vec("idx".into(), idx);
    Ok(df.take(&idx)?)
}
