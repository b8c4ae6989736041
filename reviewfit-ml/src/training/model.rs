//! Model selection and the fitted regressors it produces.

use crate::error::MlError;
use crate::training::ols;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Something that maps a feature matrix to predictions.
pub trait Regressor {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, MlError>;
}

/// A trainable model.
pub trait Model {
    type Fitted: Regressor;

    fn train(&self, x_train: &Array2<f64>, y_train: &Array1<f64>)
    -> Result<Self::Fitted, MlError>;
}

/// Supported model families, selected by configuration name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    LinearRegression,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinearRegression => "LinearRegression",
        }
    }

    /// Fit the selected model.
    pub fn train(
        &self,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
    ) -> Result<TrainedModel, MlError> {
        match self {
            Self::LinearRegression => LinearRegressionModel
                .train(x_train, y_train)
                .map(TrainedModel::LinearRegression),
        }
    }
}

impl FromStr for ModelKind {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LinearRegression" => Ok(Self::LinearRegression),
            other => Err(MlError::unsupported_model(other)),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinary least squares with an intercept and no regularization.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRegressionModel;

impl Model for LinearRegressionModel {
    type Fitted = FittedLinearRegression;

    fn train(
        &self,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
    ) -> Result<FittedLinearRegression, MlError> {
        tracing::info!(
            rows = x_train.nrows(),
            features = x_train.ncols(),
            "Training linear regression"
        );
        let solution = ols::fit(x_train.view(), y_train.view())?;
        if !solution.dropped.is_empty() {
            tracing::warn!(
                columns = ?solution.dropped,
                "Constant or collinear features received a zero coefficient"
            );
        }
        Ok(FittedLinearRegression {
            coefficients: solution.coefficients.to_vec(),
            intercept: solution.intercept,
            feature_names: Vec::new(),
        })
    }
}

/// Coefficients and intercept of a fitted linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedLinearRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub feature_names: Vec<String>,
}

impl FittedLinearRegression {
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    /// Coefficient for a named feature.
    pub fn coefficient(&self, feature: &str) -> Option<f64> {
        self.feature_names
            .iter()
            .position(|n| n == feature)
            .and_then(|i| self.coefficients.get(i).copied())
    }
}

impl Regressor for FittedLinearRegression {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, MlError> {
        if x.ncols() != self.coefficients.len() {
            return Err(MlError::shape_mismatch(
                self.coefficients.len(),
                x.ncols(),
            ));
        }
        let coef = Array1::from(self.coefficients.clone());
        Ok(x.dot(&coef) + self.intercept)
    }
}

/// A fitted model of any supported kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TrainedModel {
    LinearRegression(FittedLinearRegression),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::LinearRegression(_) => ModelKind::LinearRegression,
        }
    }

    pub fn with_feature_names(self, names: Vec<String>) -> Self {
        match self {
            Self::LinearRegression(m) => Self::LinearRegression(m.with_feature_names(names)),
        }
    }

    pub fn as_linear(&self) -> Option<&FittedLinearRegression> {
        match self {
            Self::LinearRegression(m) => Some(m),
        }
    }
}

impl Regressor for TrainedModel {
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, MlError> {
        match self {
            Self::LinearRegression(m) => m.predict(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_model_kind_from_str() {
        assert_eq!(
            "LinearRegression".parse::<ModelKind>().unwrap(),
            ModelKind::LinearRegression
        );
        let err = "RandomForest".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, MlError::UnsupportedModel { name } if name == "RandomForest"));
        assert!("linearregression".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_train_and_predict() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 2.0], [3.0, 1.0]];
        let y = x.map_axis(ndarray::Axis(1), |r| 1.5 * r[0] + 2.0 * r[1] - 1.0);
        let model = ModelKind::LinearRegression
            .train(&x, &y)
            .unwrap()
            .with_feature_names(vec!["a".into(), "b".into()]);
        assert_eq!(model.kind(), ModelKind::LinearRegression);

        let linear = model.as_linear().unwrap();
        assert!((linear.coefficient("a").unwrap() - 1.5).abs() < 1e-9);
        assert!((linear.coefficient("b").unwrap() - 2.0).abs() < 1e-9);
        assert!((linear.intercept + 1.0).abs() < 1e-9);

        let pred = model.predict(&array![[10.0, 0.0]]).unwrap();
        assert!((pred[0] - 14.0).abs() < 1e-8);
    }

    #[test]
    fn test_predict_wrong_width() {
        let fitted = FittedLinearRegression {
            coefficients: vec![1.0, 2.0],
            intercept: 0.0,
            feature_names: Vec::new(),
        };
        assert!(matches!(
            fitted.predict(&array![[1.0]]),
            Err(MlError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_training_failure_propagates() {
        let x = array![[f64::INFINITY], [1.0]];
        let y = array![1.0, 2.0];
        assert!(matches!(
            LinearRegressionModel.train(&x, &y),
            Err(MlError::Training(_))
        ));
    }

    #[test]
    fn test_trained_model_serde() {
        let model = TrainedModel::LinearRegression(FittedLinearRegression {
            coefficients: vec![0.5],
            intercept: 4.0,
            feature_names: vec!["price".into()],
        });
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["model"], "linear_regression");
        let back: TrainedModel = serde_json::from_value(json).unwrap();
        assert_eq!(back, model);
    }
}
