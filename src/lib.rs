//! House Price Predictor API
//!
//! Trains a preprocessing + gradient boosting pipeline on tabular house sale
//! data and serves single-row price predictions over HTTP:
//! - Offline training writes a versioned JSON pipeline artifact
//! - The server aligns partial feature maps onto the training column contract

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod test_support;

pub use crate::config::AppConfig;

use std::sync::Arc;

use anyhow::Context;

use api::state::AppState;
use infrastructure::services::PredictionService;

/// Build application state by loading the configured pipeline artifact.
///
/// Fails when the artifact is missing or unusable, so no listener is bound.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let path = config.model.artifact_path.clone();

    let service = tokio::task::spawn_blocking(move || PredictionService::load(&path))
        .await
        .context("Pipeline loading task panicked")??;

    Ok(AppState::new(Arc::new(service)))
}
