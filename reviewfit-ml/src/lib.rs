//! # reviewfit-ml: review score regression
//!
//! Predicts a customer review score from order, payment and product attributes
//! of an e-commerce export. A run is four steps executed in order:
//!
//! 1. **Ingest** a delimited file into a [`data::DataFrame`]
//! 2. **Clean** it (drop, impute, keep numeric) and split 80/20 with a fixed seed
//! 3. **Train** an ordinary least squares model
//! 4. **Evaluate** MSE, R2 and RMSE on the held-out rows
//!
//! [`TrainingPipeline`] composes the steps; each step is also public on its own.

// Foundation
pub mod config;
pub mod error;
pub mod tracking;

// Data engineering
pub mod data;

// Training
pub mod training;

// Evaluation
pub mod eval;

// Orchestration
pub mod pipeline;

// Re-exports
pub use config::{MetricMode, PipelineConfig, load_config};
pub use error::MlError;
pub use eval::RegressionMetrics;
pub use pipeline::{
    PipelineOutcome, TrainingPipeline, clean_data, ingest_data, model_evaluation, train_model,
};
pub use tracking::{InMemorySink, MetricsSink, NoopSink, TracingSink};
pub use training::{ModelKind, TrainedModel};
