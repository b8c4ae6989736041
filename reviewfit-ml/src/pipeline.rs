//! The training pipeline: ingest -> clean -> train -> evaluate.
//!
//! Each step takes the previous step's output and nothing else. Failures are
//! logged where they happen and returned; a failed step ends the run.

use crate::config::{MetricMode, PipelineConfig};
use crate::data::{
    CsvSource, DataFrame, DataHandler, DataSource, PreprocessStrategy, SplitStrategy,
    TrainTestSplit, schema::infer_schema, validate::validate_frame,
};
use crate::error::MlError;
use crate::eval::{Evaluation, Mse, R2, RegressionMetrics, Rmse, evaluate_model};
use crate::tracking::{Gated, MetricsSink};
use crate::training::{ModelKind, PipelineRun, Regressor, TrainedModel};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn logged(step: &'static str) -> impl FnOnce(MlError) -> MlError {
    move |e| {
        tracing::error!(step, error = %e, "Pipeline step failed");
        e
    }
}

/// Read the raw table from a delimited file.
pub fn ingest_data(path: &Path, delimiter: u8) -> Result<DataFrame, MlError> {
    tracing::info!(path = %path.display(), "Ingesting data");
    let source = CsvSource::new(path).with_delimiter(delimiter);
    let frame = source.load().map_err(logged("ingest_data"))?;

    let mut info = source.source_info();
    info.row_count = Some(frame.row_count());
    tracing::info!(
        source = %info.source_type,
        location = %info.location,
        rows = ?info.row_count,
        "Data ingested"
    );

    let schema = infer_schema(&frame);
    for col in &schema.columns {
        tracing::debug!(
            column = %col.name,
            dtype = ?col.dtype,
            nullable = col.nullable,
            "Inferred column"
        );
    }

    let report = validate_frame(&frame);
    tracing::debug!(
        rows = report.total_rows,
        columns = report.total_columns,
        duplicates = report.duplicate_rows,
        score = report.overall_score,
        incomplete = ?report.incomplete_columns(),
        "Data quality"
    );
    Ok(frame)
}

/// Preprocess the raw table and split it into train/test partitions.
pub fn clean_data(frame: DataFrame, config: &PipelineConfig) -> Result<TrainTestSplit, MlError> {
    tracing::info!("Cleaning data");
    let cleaned = DataHandler::new(PreprocessStrategy::new(config.preprocess.clone()))
        .handle_data(frame)
        .map_err(logged("clean_data"))?;
    let split = DataHandler::new(SplitStrategy::new(config.split.clone()))
        .handle_data(cleaned)
        .map_err(logged("clean_data"))?;
    tracing::info!("Data cleaned");
    Ok(split)
}

/// Fit the named model on the training partition.
///
/// The name is resolved before any data is read. With `autolog`, fit
/// statistics on the training rows are published to `sink`.
pub fn train_model(
    model_name: &str,
    split: &TrainTestSplit,
    autolog: bool,
    sink: &mut dyn MetricsSink,
) -> Result<TrainedModel, MlError> {
    tracing::info!(model = model_name, "Training model");
    let kind: ModelKind = model_name.parse().map_err(logged("train_model"))?;
    let model = kind
        .train(&split.x_train, &split.y_train)
        .map_err(logged("train_model"))?
        .with_feature_names(split.feature_names.clone());

    if autolog {
        let fitted = model
            .predict(&split.x_train)
            .map_err(logged("train_model"))?;
        let y = &split.y_train;
        let mse = Mse.calculate_scores(y, &fitted)?;
        let r2 = R2::new(MetricMode::Standard).calculate_scores(y, &fitted)?;
        let rmse = Rmse.calculate_scores(y, &fitted)?;
        sink.log_metric("training_mse", mse);
        sink.log_metric("training_r2", r2);
        sink.log_metric("training_rmse", rmse);
        sink.log_metric("training_rows", split.x_train.nrows() as f64);
    }
    Ok(model)
}

/// Score the fitted model on the test partition.
pub fn model_evaluation(
    model: &TrainedModel,
    split: &TrainTestSplit,
    mode: MetricMode,
    sink: &mut dyn MetricsSink,
) -> Result<RegressionMetrics, MlError> {
    evaluate_model(model, &split.x_test, &split.y_test, mode, sink)
        .map_err(logged("model_evaluation"))
}

/// Everything a finished run hands back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run: PipelineRun,
    pub model: TrainedModel,
    pub metrics: RegressionMetrics,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Sequential composition of the pipeline steps.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: PipelineConfig,
}

impl TrainingPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every step against the configured data path.
    pub fn run(&self, sink: &mut dyn MetricsSink) -> Result<PipelineOutcome, MlError> {
        let path = self
            .config
            .data
            .path
            .as_deref()
            .ok_or_else(|| MlError::config("no data path configured"))?;
        self.run_on(path, sink)
    }

    /// Run every step against `path`.
    pub fn run_on(
        &self,
        path: &Path,
        sink: &mut dyn MetricsSink,
    ) -> Result<PipelineOutcome, MlError> {
        let config = &self.config;
        config.validate()?;
        // Fail fast on an unknown model before reading any data.
        let kind: ModelKind = config.model.name.parse().map_err(logged("train_model"))?;

        let mut run = PipelineRun::new(kind.as_str(), &path.display().to_string(), config.split.seed);
        run.start();
        tracing::info!(run_id = %run.id, model = %kind, "Starting training pipeline");

        match self.execute(path, sink) {
            Ok((model, metrics, train_rows, test_rows)) => {
                run.complete();
                tracing::info!(
                    run_id = %run.id,
                    mse = metrics.mse,
                    r2 = metrics.r2,
                    rmse = metrics.rmse,
                    "Training pipeline finished"
                );
                Ok(PipelineOutcome {
                    run,
                    model,
                    metrics,
                    train_rows,
                    test_rows,
                })
            }
            Err(e) => {
                run.fail(&e);
                tracing::error!(run_id = %run.id, error = %e, "Training pipeline failed");
                Err(e)
            }
        }
    }

    fn execute(
        &self,
        path: &Path,
        sink: &mut dyn MetricsSink,
    ) -> Result<(TrainedModel, RegressionMetrics, usize, usize), MlError> {
        let config = &self.config;
        let delimiter = u8::try_from(config.data.delimiter)
            .map_err(|_| MlError::config("data.delimiter must be ASCII"))?;

        let frame = ingest_data(path, delimiter)?;
        let split = clean_data(frame, config)?;
        let model = train_model(&config.model.name, &split, config.tracking.autolog, sink)?;

        let mut gated = Gated {
            inner: sink,
            enabled: config.tracking.log_metrics,
        };
        let metrics = model_evaluation(&model, &split, config.evaluation.metric_mode, &mut gated)?;
        Ok((model, metrics, split.x_train.nrows(), split.x_test.nrows()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use crate::tracking::InMemorySink;
    use ndarray::{Array1, array};

    fn split() -> TrainTestSplit {
        let x_train = array![[0.0], [1.0], [2.0], [3.0]];
        let y_train: Array1<f64> = x_train.column(0).mapv(|v| 2.0 * v + 1.0);
        TrainTestSplit {
            x_train,
            x_test: array![[4.0], [5.0]],
            y_train,
            y_test: array![9.0, 11.5],
            feature_names: vec!["x".into()],
            train_indices: vec![0, 1, 2, 3],
            test_indices: vec![4, 5],
        }
    }

    #[test]
    fn test_train_model_rejects_unknown_name() {
        let mut sink = InMemorySink::new();
        let err = train_model("RandomForest", &split(), true, &mut sink).unwrap_err();
        assert!(matches!(err, MlError::UnsupportedModel { .. }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_train_model_autolog() {
        let mut sink = InMemorySink::new();
        let model = train_model("LinearRegression", &split(), true, &mut sink).unwrap();
        assert_eq!(model.as_linear().unwrap().feature_names, vec!["x"]);
        assert!(sink.get("training_mse").unwrap() < 1e-12);
        assert_eq!(sink.get("training_rows"), Some(4.0));

        let mut quiet = InMemorySink::new();
        train_model("LinearRegression", &split(), false, &mut quiet).unwrap();
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_model_evaluation() {
        let mut sink = InMemorySink::new();
        let s = split();
        let model = train_model("LinearRegression", &s, false, &mut sink).unwrap();
        let metrics = model_evaluation(&model, &s, MetricMode::Standard, &mut sink).unwrap();
        // predictions 9 and 11, residuals 0 and 0.5
        assert!((metrics.mse - 0.125).abs() < 1e-9);
        assert_eq!(sink.names(), vec!["MSE", "R2", "RMSE"]);
    }

    #[test]
    fn test_ingest_data_reads_delimited_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("orders.csv");
        std::fs::write(&path, "price;city;review_score\n1.5;x;5\n;y;4\n").unwrap();

        let frame = ingest_data(&path, b';').unwrap();
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.column_names(), vec!["price", "city", "review_score"]);

        let schema = infer_schema(&frame);
        assert!(schema.columns[0].nullable);
        assert!(!schema.columns[1].dtype.is_numeric());
    }

    #[test]
    fn test_clean_data_missing_column() {
        let frame = DataFrame::new(vec![Column::numeric("review_score", vec![1.0, 2.0])]).unwrap();
        let err = clean_data(frame, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, MlError::MissingColumn { .. }));
    }

    #[test]
    fn test_run_without_path() {
        let pipeline = TrainingPipeline::new(PipelineConfig::default());
        assert!(matches!(
            pipeline.run(&mut InMemorySink::new()),
            Err(MlError::Config(_))
        ));
    }

    #[test]
    fn test_unsupported_model_fails_before_ingest() {
        let mut config = PipelineConfig::default();
        config.model.name = "RandomForest".into();
        let pipeline = TrainingPipeline::new(config);
        // The file does not exist; an IO error would mean ingestion ran first.
        let err = pipeline
            .run_on(Path::new("/no/such/file.csv"), &mut InMemorySink::new())
            .unwrap_err();
        assert!(matches!(err, MlError::UnsupportedModel { .. }));
    }
}
