//! Feature/target separation and seeded train/test partitioning.

use crate::config::SplitConfig;
use crate::data::frame::{ColumnValues, DataFrame};
use crate::data::strategy::DataStrategy;
use crate::error::MlError;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Train and test partitions of the feature matrix and target vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
    /// Feature column names, in matrix column order.
    pub feature_names: Vec<String>,
    /// Original row index of each training row.
    pub train_indices: Vec<usize>,
    /// Original row index of each test row.
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

/// Separates the target column and shuffles rows into train/test sets.
#[derive(Debug, Clone, Default)]
pub struct SplitStrategy {
    config: SplitConfig,
}

impl SplitStrategy {
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Number of test rows for `n` samples: `ceil(test_size * n)`.
    pub fn test_count(&self, n: usize) -> usize {
        (self.config.test_size * n as f64).ceil() as usize
    }

    /// Row permutation for `n` samples, fixed by the configured seed.
    pub fn permutation(&self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);
        indices
    }

    /// Shuffled `(train, test)` row indices.
    pub fn partition(&self, n: usize) -> Result<(Vec<usize>, Vec<usize>), MlError> {
        let test_size = self.config.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(MlError::config(format!(
                "test_size must be in (0, 1), got {test_size}"
            )));
        }
        if n == 0 {
            return Err(MlError::dataset("cannot split an empty dataset"));
        }
        let n_test = self.test_count(n);
        if n_test >= n {
            return Err(MlError::dataset(format!(
                "with {n} samples and test_size {test_size} the training set would be empty"
            )));
        }

        let mut permutation = self.permutation(n);
        let train = permutation.split_off(n_test);
        Ok((train, permutation))
    }
}

impl DataStrategy for SplitStrategy {
    type Output = TrainTestSplit;

    fn name(&self) -> &'static str {
        "split"
    }

    fn handle_data(&self, mut data: DataFrame) -> Result<TrainTestSplit, MlError> {
        tracing::info!("Splitting data");
        let target = data.remove_column(&self.config.target_column)?;
        let y = match target.values {
            ColumnValues::Numeric(v) => v,
            ColumnValues::Text(_) => {
                return Err(MlError::dataset(format!(
                    "target column '{}' is not numeric",
                    self.config.target_column
                )));
            }
        };

        let mut feature_names = Vec::with_capacity(data.column_count());
        let mut features: Vec<&[f64]> = Vec::with_capacity(data.column_count());
        for col in data.columns() {
            let values = col.as_numeric().ok_or_else(|| {
                MlError::dataset(format!("feature column '{}' is not numeric", col.name))
            })?;
            feature_names.push(col.name.clone());
            features.push(values);
        }

        let (train_indices, test_indices) = self.partition(y.len())?;
        let gather_x = |rows: &[usize]| {
            Array2::from_shape_fn((rows.len(), features.len()), |(i, j)| features[j][rows[i]])
        };
        let gather_y = |rows: &[usize]| rows.iter().map(|&i| y[i]).collect::<Array1<f64>>();

        let split = TrainTestSplit {
            x_train: gather_x(&train_indices),
            x_test: gather_x(&test_indices),
            y_train: gather_y(&train_indices),
            y_test: gather_y(&test_indices),
            feature_names,
            train_indices,
            test_indices,
        };
        tracing::debug!(
            train_rows = split.train_indices.len(),
            test_rows = split.test_indices.len(),
            features = split.n_features(),
            "Dataset split"
        );
        Ok(split)
    }
}
