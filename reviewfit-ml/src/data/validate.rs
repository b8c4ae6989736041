//! Data quality report for an ingested frame.

use crate::data::frame::{ColumnValues, DataFrame};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A data quality report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub null_percentage: BTreeMap<String, f64>,
    pub duplicate_rows: usize,
    pub overall_score: f64,
}

impl DataQualityReport {
    /// Columns with at least one missing value, most incomplete first.
    pub fn incomplete_columns(&self) -> Vec<(&str, f64)> {
        let mut cols: Vec<(&str, f64)> = self
            .null_percentage
            .iter()
            .filter(|(_, pct)| **pct > 0.0)
            .map(|(name, pct)| (name.as_str(), *pct))
            .collect();
        cols.sort_by(|a, b| b.1.total_cmp(&a.1));
        cols
    }
}

/// Validate a frame and produce a quality report.
pub fn validate_frame(frame: &DataFrame) -> DataQualityReport {
    let total_rows = frame.row_count();
    let total_columns = frame.column_count();

    let null_percentage: BTreeMap<String, f64> = frame
        .columns()
        .iter()
        .map(|col| {
            let pct = if total_rows > 0 {
                col.values.missing_count() as f64 / total_rows as f64 * 100.0
            } else {
                0.0
            };
            (col.name.clone(), pct)
        })
        .collect();

    let mut seen = HashSet::new();
    let mut duplicate_rows = 0;
    for row in 0..total_rows {
        if !seen.insert(row_key(frame, row)) {
            duplicate_rows += 1;
        }
    }

    let avg_null = if null_percentage.is_empty() {
        0.0
    } else {
        null_percentage.values().sum::<f64>() / null_percentage.len() as f64
    };
    let dup_penalty = if total_rows > 0 {
        duplicate_rows as f64 / total_rows as f64
    } else {
        0.0
    };
    let overall_score = (1.0 - avg_null / 100.0 - dup_penalty).clamp(0.0, 1.0);

    DataQualityReport {
        total_rows,
        total_columns,
        null_percentage,
        duplicate_rows,
        overall_score,
    }
}

/// One cell of a row, compared by value. Numbers compare by bit pattern so
/// missing values equal each other.
#[derive(Debug, PartialEq, Eq, Hash)]
enum Cell<'a> {
    Number(u64),
    Text(Option<&'a str>),
}

fn row_key(frame: &DataFrame, row: usize) -> Vec<Cell<'_>> {
    frame
        .columns()
        .iter()
        .map(|col| match &col.values {
            ColumnValues::Numeric(v) => Cell::Number(v[row].to_bits()),
            ColumnValues::Text(v) => Cell::Text(v[row].as_deref()),
        })
        .collect()
}
