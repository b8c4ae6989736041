//! Cleaning strategy for the raw review export.

use crate::config::PreprocessConfig;
use crate::data::frame::DataFrame;
use crate::data::strategy::DataStrategy;
use crate::data::transform::{TransformPipeline, TransformStep};
use crate::error::MlError;

/// Drops non-predictive columns, imputes gaps and keeps numeric columns only.
///
/// The free-text fill runs before the numeric filter removes that column, so
/// it has no effect on the output; the step is kept for parity with the
/// cleaned data earlier runs produced.
#[derive(Debug, Clone, Default)]
pub struct PreprocessStrategy {
    config: PreprocessConfig,
}

impl PreprocessStrategy {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// The transform steps this strategy applies, in order.
    pub fn pipeline(&self) -> TransformPipeline {
        let mut pipeline = TransformPipeline::new().add_step(TransformStep::DropColumns {
            columns: self.config.drop_columns.clone(),
        });
        for column in &self.config.median_columns {
            pipeline = pipeline.add_step(TransformStep::FillMedian {
                column: column.clone(),
            });
        }
        pipeline
            .add_step(TransformStep::FillText {
                column: self.config.text_column.clone(),
                value: self.config.text_fill.clone(),
            })
            .add_step(TransformStep::SelectNumeric)
    }
}

impl DataStrategy for PreprocessStrategy {
    type Output = DataFrame;

    fn name(&self) -> &'static str {
        "preprocess"
    }

    fn handle_data(&self, data: DataFrame) -> Result<DataFrame, MlError> {
        tracing::info!(
            rows = data.row_count(),
            columns = data.column_count(),
            "Preprocessing data"
        );
        let cleaned = self.pipeline().apply(data)?;
        tracing::debug!(columns = ?cleaned.column_names(), "Preprocessed columns");
        Ok(cleaned)
    }
}
