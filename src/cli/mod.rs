//! CLI module for the House Price Predictor
//!
//! - `serve`: load the pipeline artifact and run the HTTP API
//! - `train`: fit the pipeline on a CSV dataset and write the artifacts

pub mod serve;
pub mod train;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// House Price Predictor - train and serve a sale price regression pipeline
#[derive(Parser)]
#[command(name = "house-price-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve predictions over HTTP
    Serve(serve::ServeArgs),

    /// Fit the pipeline and export the artifact plus schema files
    Train(train::TrainArgs),
}

/// Load `.env` and layered configuration, then install logging
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init_logging(&config.logging);

    Ok(config)
}
