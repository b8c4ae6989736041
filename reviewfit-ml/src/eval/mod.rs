//! Regression scoring.

pub mod metrics;

pub use metrics::{Evaluation, Mse, R2, RegressionMetrics, Rmse, evaluate_model};
