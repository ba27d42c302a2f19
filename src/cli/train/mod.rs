//! Train command - fits the pipeline offline and writes the artifacts

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::TrainingConfig;
use crate::infrastructure::services::TrainingService;

#[derive(Debug, Args)]
pub struct TrainArgs {
    /// Training CSV (overrides `training.dataset_path`)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Target column (overrides `training.target_column`)
    #[arg(long)]
    pub target: Option<String>,

    /// Pipeline artifact output path (overrides `training.artifact_path`)
    #[arg(long)]
    pub model_out: Option<PathBuf>,

    /// Directory for columns.json and X_preprocessed.csv (overrides `training.schema_dir`)
    #[arg(long)]
    pub schema_dir: Option<PathBuf>,

    /// Random seed for the split and the booster (overrides `training.seed`)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl TrainArgs {
    fn apply(self, config: &mut TrainingConfig) {
        if let Some(data) = self.data {
            config.dataset_path = data;
        }
        if let Some(target) = self.target {
            config.target_column = target;
        }
        if let Some(model_out) = self.model_out {
            config.artifact_path = model_out;
        }
        if let Some(schema_dir) = self.schema_dir {
            config.schema_dir = schema_dir;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
    }
}

pub async fn run(args: TrainArgs) -> anyhow::Result<()> {
    let mut config = super::load_config()?.training;
    args.apply(&mut config);

    info!(
        dataset = %config.dataset_path.display(),
        target = %config.target_column,
        "Starting training run"
    );

    let service = TrainingService::new(config);
    let report = tokio::task::spawn_blocking(move || service.run()).await??;

    info!(
        artifact = %report.artifact_path.display(),
        raw_columns = report.raw_columns,
        transformed_columns = report.transformed_columns,
        train_rows = report.n_train,
        validation_rows = report.n_validation,
        "Validation RMSE: {:.2}",
        report.validation_rmse
    );
    for path in &report.schema_paths {
        info!("Saved {}", path.display());
    }

    Ok(())
}
