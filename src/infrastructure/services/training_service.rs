//! Training service - offline fit and export of the price pipeline

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::TrainingConfig;
use crate::domain::training::{build_pipeline, export, fit, infer_column_roles};
use crate::domain::{DomainError, FitOptions};
use crate::infrastructure::artifact::{FileArtifactStore, SchemaFiles};
use crate::infrastructure::dataset::load_csv;

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifact_path: PathBuf,
    pub schema_paths: Vec<PathBuf>,
    pub validation_rmse: f64,
    pub n_train: usize,
    pub n_validation: usize,
    pub raw_columns: usize,
    pub transformed_columns: usize,
}

#[derive(Debug, Clone)]
pub struct TrainingService {
    config: TrainingConfig,
}

impl TrainingService {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Load the dataset, fit, and write the artifact plus schema files.
    ///
    /// Nothing is written unless fitting and export both succeed. Schema files
    /// go first and the artifact last, so a serving process never sees an
    /// artifact whose schema files failed to write.
    pub fn run(&self) -> Result<TrainingReport, DomainError> {
        let config = &self.config;
        let dataset = load_csv(&config.dataset_path)?;

        let schema = infer_column_roles(&dataset, &config.target_column)?;
        let spec = build_pipeline(schema, config.booster());
        let options = FitOptions {
            test_size: config.test_size,
            seed: config.seed,
        };

        let fitted = fit(&spec, &dataset, &config.target_column, options)?;
        let (n_train, n_validation) = (fitted.n_train, fitted.n_validation);

        let bundle = export(fitted, &spec, &dataset, &config.target_column)?;
        let schema_files = SchemaFiles::render(&bundle.transformed_columns)?;

        let schema_paths = schema_files.write_to(&config.schema_dir)?;

        let store = FileArtifactStore::new(&config.artifact_path);
        if let Err(e) = store.save(&bundle.artifact) {
            for path in &schema_paths {
                if let Err(remove_err) = fs::remove_file(path) {
                    warn!(path = %path.display(), error = %remove_err, "Failed to remove schema file");
                }
            }
            return Err(e);
        }

        info!(
            artifact = %config.artifact_path.display(),
            rmse = bundle.artifact.validation_rmse,
            "Training complete"
        );

        Ok(TrainingReport {
            artifact_path: config.artifact_path.clone(),
            schema_paths,
            validation_rmse: bundle.artifact.validation_rmse,
            n_train,
            n_validation,
            raw_columns: bundle.raw_columns.len(),
            transformed_columns: bundle.transformed_columns.len(),
        })
    }
}
