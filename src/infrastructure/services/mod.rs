//! Infrastructure services

mod prediction_service;
mod training_service;

pub use prediction_service::{PredictionService, ServiceHealth};
pub use training_service::{TrainingReport, TrainingService};
