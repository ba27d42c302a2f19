//! Application state for shared services

use std::sync::Arc;

use crate::domain::{DomainError, FeatureMap};
use crate::infrastructure::services::{PredictionService, ServiceHealth};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub prediction_service: Arc<dyn PredictionServiceTrait>,
}

impl AppState {
    pub fn new(prediction_service: Arc<dyn PredictionServiceTrait>) -> Self {
        Self { prediction_service }
    }
}

/// Trait for prediction service operations
#[async_trait::async_trait]
pub trait PredictionServiceTrait: Send + Sync {
    async fn predict(&self, features: &FeatureMap) -> Result<f64, DomainError>;
    async fn describe_schema(&self) -> Result<Vec<String>, DomainError>;
    async fn health(&self) -> ServiceHealth;
}

#[async_trait::async_trait]
impl PredictionServiceTrait for PredictionService {
    async fn predict(&self, features: &FeatureMap) -> Result<f64, DomainError> {
        PredictionService::predict(self, features)
    }

    async fn describe_schema(&self) -> Result<Vec<String>, DomainError> {
        PredictionService::describe_schema(self)
    }

    async fn health(&self) -> ServiceHealth {
        PredictionService::health(self)
    }
}
