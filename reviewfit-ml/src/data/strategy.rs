//! Interchangeable data-handling strategies.

use crate::data::frame::DataFrame;
use crate::error::MlError;

/// A step that consumes a frame and produces the next stage's input.
pub trait DataStrategy {
    type Output;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    fn handle_data(&self, data: DataFrame) -> Result<Self::Output, MlError>;
}

/// Runs a strategy, logging failures before handing them back.
pub struct DataHandler<S> {
    strategy: S,
}

impl<S: DataStrategy> DataHandler<S> {
    pub fn new(strategy: S) -> Self {
        Self { strategy }
    }

    pub fn handle_data(&self, data: DataFrame) -> Result<S::Output, MlError> {
        tracing::info!(strategy = self.strategy.name(), "Handling data");
        self.strategy.handle_data(data).map_err(|e| {
            tracing::error!(strategy = self.strategy.name(), error = %e, "Error handling data");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::frame::Column;

    struct CountRows;

    impl DataStrategy for CountRows {
        type Output = usize;

        fn name(&self) -> &'static str {
            "count_rows"
        }

        fn handle_data(&self, data: DataFrame) -> Result<usize, MlError> {
            if data.row_count() == 0 {
                return Err(MlError::dataset("no rows"));
            }
            Ok(data.row_count())
        }
    }

    #[test]
    fn test_handler_delegates() {
        let frame = DataFrame::new(vec![Column::numeric("a", vec![1.0, 2.0])]).unwrap();
        let handler = DataHandler::new(CountRows);
        assert_eq!(handler.handle_data(frame).unwrap(), 2);
    }

    #[test]
    fn test_handler_propagates_errors() {
        let handler = DataHandler::new(CountRows);
        assert!(matches!(
            handler.handle_data(DataFrame::empty()),
            Err(MlError::Dataset(_))
        ));
    }
}
