use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::GradientBoostingConfig;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where the prediction service loads its pipeline from
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub artifact_path: PathBuf,
}

/// Offline training run settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub dataset_path: PathBuf,
    pub target_column: String,
    pub artifact_path: PathBuf,
    /// Directory receiving `columns.json` and `X_preprocessed.csv`
    pub schema_dir: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub subsample: f64,
    pub colsample_bytree: f64,
    pub min_samples_leaf: usize,
    pub reg_lambda: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            artifact_path: PathBuf::from("app/house_price_pipeline.json"),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let booster = GradientBoostingConfig::default();
        Self {
            dataset_path: PathBuf::from("data/train.csv"),
            target_column: "SalePrice".to_string(),
            artifact_path: ModelConfig::default().artifact_path,
            schema_dir: PathBuf::from("data"),
            test_size: 0.2,
            seed: booster.random_state,
            n_estimators: booster.n_estimators,
            max_depth: booster.max_depth,
            learning_rate: booster.learning_rate,
            subsample: booster.subsample,
            colsample_bytree: booster.colsample_bytree,
            min_samples_leaf: booster.min_samples_leaf,
            reg_lambda: booster.reg_lambda,
        }
    }
}

impl TrainingConfig {
    pub fn booster(&self) -> GradientBoostingConfig {
        GradientBoostingConfig {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            max_depth: self.max_depth,
            min_samples_leaf: self.min_samples_leaf,
            subsample: self.subsample,
            colsample_bytree: self.colsample_bytree,
            reg_lambda: self.reg_lambda,
            random_state: self.seed,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
