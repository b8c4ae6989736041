//! Regression metrics sharing one scoring contract.

use crate::config::MetricMode;
use crate::error::MlError;
use crate::tracking::MetricsSink;
use crate::training::model::Regressor;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A score computed from true and predicted targets.
pub trait Evaluation {
    /// Name the score is published under.
    fn name(&self) -> &'static str;

    fn calculate_scores(&self, y_true: &Array1<f64>, y_pred: &Array1<f64>)
    -> Result<f64, MlError>;
}

fn check_shapes(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<(), MlError> {
    if y_true.len() != y_pred.len() {
        return Err(MlError::shape_mismatch(y_true.len(), y_pred.len()));
    }
    if y_true.is_empty() {
        return Err(MlError::evaluation("cannot score empty predictions"));
    }
    Ok(())
}

fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, MlError> {
    check_shapes(y_true, y_pred)?;
    let sum: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    Ok(sum / y_true.len() as f64)
}

fn coefficient_of_determination(
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
) -> Result<f64, MlError> {
    check_shapes(y_true, y_pred)?;
    let mean = y_true.sum() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        // Constant target: only an exact fit explains it.
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Mean squared error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mse;

impl Evaluation for Mse {
    fn name(&self) -> &'static str {
        "MSE"
    }

    fn calculate_scores(
        &self,
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
    ) -> Result<f64, MlError> {
        tracing::info!("Calculating Mean Squared Error");
        let mse = mean_squared_error(y_true, y_pred)?;
        tracing::info!(mse, "Mean Squared Error");
        Ok(mse)
    }
}

/// The "R2" score. Its definition depends on [`MetricMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct R2 {
    pub mode: MetricMode,
}

impl R2 {
    pub fn new(mode: MetricMode) -> Self {
        Self { mode }
    }
}

impl Evaluation for R2 {
    fn name(&self) -> &'static str {
        "R2"
    }

    fn calculate_scores(
        &self,
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
    ) -> Result<f64, MlError> {
        tracing::info!(mode = ?self.mode, "Calculating R2 Score");
        let r2 = match self.mode {
            MetricMode::Standard => coefficient_of_determination(y_true, y_pred)?,
            // Earlier reports published the mean squared error under this name.
            MetricMode::Legacy => mean_squared_error(y_true, y_pred)?,
        };
        tracing::info!(r2, "R2 Score");
        Ok(r2)
    }
}

/// Root mean squared error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl Evaluation for Rmse {
    fn name(&self) -> &'static str {
        "RMSE"
    }

    fn calculate_scores(
        &self,
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
    ) -> Result<f64, MlError> {
        tracing::info!("Calculating Root Mean Squared Error");
        let rmse = mean_squared_error(y_true, y_pred)?.sqrt();
        tracing::info!(rmse, "Root Mean Squared Error");
        Ok(rmse)
    }
}

/// Scores of one evaluation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub r2: f64,
    pub rmse: f64,
    pub mode: MetricMode,
}

impl RegressionMetrics {
    pub fn is_finite(&self) -> bool {
        self.mse.is_finite() && self.r2.is_finite() && self.rmse.is_finite()
    }
}

/// Predict on the test set, score it, and publish each score.
pub fn evaluate_model(
    model: &impl Regressor,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    mode: MetricMode,
    sink: &mut dyn MetricsSink,
) -> Result<RegressionMetrics, MlError> {
    tracing::info!(rows = x_test.nrows(), "Evaluating model");
    let prediction = model.predict(x_test)?;

    let mut score = |metric: &dyn Evaluation| -> Result<f64, MlError> {
        let value = metric.calculate_scores(y_test, &prediction)?;
        sink.log_metric(metric.name(), value);
        Ok(value)
    };
    let mse = score(&Mse)?;
    let r2 = score(&R2::new(mode))?;
    let rmse = score(&Rmse)?;

    Ok(RegressionMetrics {
        mse,
        r2,
        rmse,
        mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::InMemorySink;
    use crate::training::model::FittedLinearRegression;
    use ndarray::array;

    #[test]
    fn test_mse_identical_is_zero() {
        let y = array![1.0, 2.0, 3.0];
        assert_eq!(Mse.calculate_scores(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_mse_value() {
        let t = array![1.0, 2.0, 3.0];
        let p = array![2.0, 2.0, 5.0];
        assert!((Mse.calculate_scores(&t, &p).unwrap() - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_squared_matches_mse() {
        let t = array![3.0, -1.0, 4.5, 2.0];
        let p = array![2.5, 0.0, 4.0, 3.0];
        let mse = Mse.calculate_scores(&t, &p).unwrap();
        let rmse = Rmse.calculate_scores(&t, &p).unwrap();
        assert!((rmse * rmse - mse).abs() < 1e-12);
    }

    #[test]
    fn test_r2_standard() {
        let t = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(R2::default().calculate_scores(&t, &t).unwrap(), 1.0);

        let mean = array![2.5, 2.5, 2.5, 2.5];
        assert!(R2::default().calculate_scores(&t, &mean).unwrap().abs() < 1e-12);

        let p = array![1.5, 2.0, 2.5, 4.5];
        // ss_res = 0.75, ss_tot = 5.0
        assert!((R2::default().calculate_scores(&t, &p).unwrap() - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_r2_constant_target() {
        let t = array![2.0, 2.0];
        assert_eq!(R2::default().calculate_scores(&t, &t).unwrap(), 1.0);
        assert_eq!(
            R2::default()
                .calculate_scores(&t, &array![1.0, 2.0])
                .unwrap(),
            0.0
        );
    }

    #[test]
    fn test_r2_legacy_equals_mse() {
        let t = array![1.0, 2.0, 3.0];
        let p = array![1.0, 1.0, 1.0];
        let legacy = R2::new(MetricMode::Legacy).calculate_scores(&t, &p).unwrap();
        assert_eq!(legacy, Mse.calculate_scores(&t, &p).unwrap());
    }

    #[test]
    fn test_shape_mismatch() {
        let t = array![1.0, 2.0];
        let p = array![1.0];
        for metric in [&Mse as &dyn Evaluation, &R2::default(), &Rmse] {
            assert!(matches!(
                metric.calculate_scores(&t, &p),
                Err(MlError::ShapeMismatch {
                    expected: 2,
                    actual: 1
                })
            ));
        }
    }

    #[test]
    fn test_empty_inputs() {
        let e = Array1::<f64>::zeros(0);
        assert!(matches!(
            Mse.calculate_scores(&e, &e),
            Err(MlError::Evaluation(_))
        ));
    }

    #[test]
    fn test_evaluate_model_publishes_in_order() {
        let model = FittedLinearRegression {
            coefficients: vec![1.0],
            intercept: 0.0,
            feature_names: vec!["x".into()],
        };
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0, 4.0];
        let mut sink = InMemorySink::new();
        let metrics = evaluate_model(&model, &x, &y, MetricMode::Standard, &mut sink).unwrap();

        assert_eq!(sink.names(), vec!["MSE", "R2", "RMSE"]);
        assert!((metrics.mse - 1.0 / 3.0).abs() < 1e-12);
        assert!((metrics.rmse - (1.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(sink.get("R2"), Some(metrics.r2));
        assert!(metrics.is_finite());
    }
}
