//! Configuration types for the reviewfit pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> explicit file -> environment. CLI flags are applied
//! on top of the extracted value by the caller.

use crate::error::MlError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Input dataset configuration.
    #[serde(default)]
    pub data: DataConfig,
    /// Cleaning strategy configuration.
    #[serde(default)]
    pub preprocess: PreprocessConfig,
    /// Train/test split configuration.
    #[serde(default)]
    pub split: SplitConfig,
    /// Model selection.
    #[serde(default)]
    pub model: ModelConfig,
    /// Metric computation.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Metric publishing.
    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl PipelineConfig {
    /// Reject values no run could succeed with.
    pub fn validate(&self) -> Result<(), MlError> {
        if self.split.target_column.trim().is_empty() {
            return Err(MlError::config("split.target_column must not be empty"));
        }
        if !(self.split.test_size > 0.0 && self.split.test_size < 1.0) {
            return Err(MlError::config(format!(
                "split.test_size must be in (0, 1), got {}",
                self.split.test_size
            )));
        }
        if self.model.name.trim().is_empty() {
            return Err(MlError::config("model.name must not be empty"));
        }
        if !self.data.delimiter.is_ascii() {
            return Err(MlError::config(format!(
                "data.delimiter must be a single ASCII character, got {:?}",
                self.data.delimiter
            )));
        }
        Ok(())
    }
}

/// Input dataset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the delimited input file.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Field delimiter.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> char {
    ','
}

/// Columns touched by the preprocessing strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Non-predictive columns removed before anything else.
    #[serde(default = "default_drop_columns")]
    pub drop_columns: Vec<String>,
    /// Numeric columns whose missing values take the column median.
    #[serde(default = "default_median_columns")]
    pub median_columns: Vec<String>,
    /// Free-text column filled with `text_fill`.
    #[serde(default = "default_text_column")]
    pub text_column: String,
    #[serde(default = "default_text_fill")]
    pub text_fill: String,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            drop_columns: default_drop_columns(),
            median_columns: default_median_columns(),
            text_column: default_text_column(),
            text_fill: default_text_fill(),
        }
    }
}

fn default_drop_columns() -> Vec<String> {
    [
        "order_approved_at",
        "order_delivered_carrier_date",
        "order_delivered_customer_date",
        "order_estimated_delivery_date",
        "order_purchase_timestamp",
        "customer_zip_code_prefix",
        "order_item_id",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_median_columns() -> Vec<String> {
    [
        "product_weight_g",
        "product_length_cm",
        "product_height_cm",
        "product_width_cm",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_text_column() -> String {
    "review_comment_message".to_string()
}

fn default_text_fill() -> String {
    "No review".to_string()
}

/// Train/test split configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Fraction of rows held out for evaluation.
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Shuffle seed.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            target_column: default_target_column(),
            test_size: default_test_size(),
            seed: default_seed(),
        }
    }
}

fn default_target_column() -> String {
    "review_score".to_string()
}

fn default_test_size() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name, resolved by `ModelKind::from_str`.
    #[serde(default = "default_model_name")]
    pub name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
        }
    }
}

fn default_model_name() -> String {
    "LinearRegression".to_string()
}

/// How the "R2" score is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricMode {
    /// Coefficient of determination.
    #[default]
    Standard,
    /// Historical behavior: "R2" reports the mean squared error.
    Legacy,
}

impl FromStr for MetricMode {
    type Err = MlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "legacy" => Ok(Self::Legacy),
            other => Err(MlError::config(format!(
                "unknown metric mode '{other}' (expected 'standard' or 'legacy')"
            ))),
        }
    }
}

/// Metric computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationConfig {
    #[serde(default)]
    pub metric_mode: MetricMode,
}

/// Metric publishing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Publish training-set fit statistics from the training step.
    #[serde(default = "default_true")]
    pub autolog: bool,
    /// Publish evaluation scores.
    #[serde(default = "default_true")]
    pub log_metrics: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            autolog: true,
            log_metrics: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".reviewfit").join("config.toml")
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "reviewfit", "reviewfit")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `REVIEWFIT_`, nested with `__`)
/// 2. Explicit config file
/// 3. Workspace-local config (`.reviewfit/config.toml`)
/// 4. User config (`~/.config/reviewfit/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<PipelineConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Box::new(figment::Error::from(format!(
                "config file not found: {}",
                path.display()
            ))));
        }
        figment = figment.merge(Toml::file(path));
    }

    // REVIEWFIT_SPLIT__SEED, REVIEWFIT_MODEL__NAME, ...
    figment = figment.merge(Env::prefixed("REVIEWFIT_").split("__"));

    figment.extract().map_err(Box::new)
}
