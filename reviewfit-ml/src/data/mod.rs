//! Data handling: ingestion, cleaning strategies, splitting, quality checks.

pub mod frame;
pub mod preprocess;
pub mod schema;
pub mod source;
pub mod split;
pub mod strategy;
pub mod transform;
pub mod validate;

pub use frame::{Column, ColumnValues, DataFrame};
pub use preprocess::PreprocessStrategy;
pub use schema::{ColumnType, SchemaDefinition};
pub use source::{CsvSource, DataSource, DataSourceInfo};
pub use split::{SplitStrategy, TrainTestSplit};
pub use strategy::{DataHandler, DataStrategy};
pub use transform::{TransformPipeline, TransformStep};
pub use validate::DataQualityReport;
