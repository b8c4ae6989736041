//! Data transformation pipeline.

use crate::data::frame::{ColumnValues, DataFrame};
use crate::data::schema::ColumnType;
use crate::error::MlError;
use serde::{Deserialize, Serialize};

/// A transformation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformStep {
    /// Remove columns; every one of them must exist.
    DropColumns { columns: Vec<String> },
    /// Replace missing numeric values with the column median.
    FillMedian { column: String },
    /// Replace missing values with a fixed string.
    FillText { column: String, value: String },
    /// Keep only numeric columns.
    SelectNumeric,
}

/// A pipeline of transformation steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformPipeline {
    pub steps: Vec<TransformStep>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step(mut self, step: TransformStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Apply the pipeline to a frame.
    pub fn apply(&self, mut frame: DataFrame) -> Result<DataFrame, MlError> {
        for step in &self.steps {
            let columns_before = frame.column_count();
            frame = apply_step(frame, step)?;
            tracing::debug!(
                step = ?step,
                columns_before,
                columns_after = frame.column_count(),
                "Applied transform"
            );
        }
        Ok(frame)
    }
}

fn apply_step(mut frame: DataFrame, step: &TransformStep) -> Result<DataFrame, MlError> {
    match step {
        TransformStep::DropColumns { columns } => {
            // Check all names first so a failure leaves no partial drop behind.
            if let Some(missing) = columns.iter().find(|c| frame.position(c).is_none()) {
                return Err(MlError::missing_column(missing.as_str()));
            }
            for column in columns {
                frame.remove_column(column)?;
            }
            Ok(frame)
        }
        TransformStep::FillMedian { column } => {
            let col = frame.column_mut(column)?;
            match &mut col.values {
                ColumnValues::Numeric(values) => {
                    if let Some(m) = median(values) {
                        let mut filled = false;
                        for v in values.iter_mut().filter(|v| v.is_nan()) {
                            *v = m;
                            filled = true;
                        }
                        // A fractional fill no longer fits an integer column.
                        if filled && m.fract() != 0.0 && col.dtype == ColumnType::Integer {
                            col.dtype = ColumnType::Float;
                        }
                    }
                    Ok(frame)
                }
                ColumnValues::Text(_) => Err(MlError::dataset(format!(
                    "cannot compute median of non-numeric column '{column}'"
                ))),
            }
        }
        TransformStep::FillText { column, value } => {
            let col = frame.column_mut(column)?;
            match &mut col.values {
                ColumnValues::Text(values) => {
                    for v in values.iter_mut().filter(|v| v.is_none()) {
                        *v = Some(value.clone());
                    }
                }
                ColumnValues::Numeric(values) => {
                    // A string fill turns a numeric column with gaps into a text column.
                    if values.iter().any(|v| v.is_nan()) {
                        let text = values
                            .iter()
                            .map(|v| {
                                Some(if v.is_nan() {
                                    value.clone()
                                } else {
                                    v.to_string()
                                })
                            })
                            .collect();
                        col.values = ColumnValues::Text(text);
                        col.dtype = ColumnType::String;
                    }
                }
            }
            Ok(frame)
        }
        TransformStep::SelectNumeric => {
            frame.retain_columns(|c| c.is_numeric());
            Ok(frame)
        }
    }
}

/// Median of the non-missing values, `None` when there are none.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut observed: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if observed.is_empty() {
        return None;
    }
    observed.sort_by(f64::total_cmp);
    let mid = observed.len() / 2;
    if observed.len() % 2 == 0 {
        Some((observed[mid - 1] + observed[mid]) / 2.0)
    } else {
        Some(observed[mid])
    }
}
