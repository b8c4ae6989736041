//! Training infrastructure: model selection, OLS fitting, run records.

pub mod experiment;
pub mod model;
pub mod ols;

pub use experiment::{PipelineRun, RunStatus};
pub use model::{
    FittedLinearRegression, LinearRegressionModel, Model, ModelKind, Regressor, TrainedModel,
};
