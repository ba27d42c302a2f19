//! Fitted preprocessing + regressor pipeline and its persisted artifact

use chrono::{DateTime, Utc};
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::feature::FeatureRow;
use crate::domain::preprocessing::ColumnTransformer;
use crate::domain::regressor::GradientBoostingRegressor;

/// Version of the artifact layout written by this crate
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePipeline {
    preprocessor: ColumnTransformer,
    regressor: GradientBoostingRegressor,
}

impl PricePipeline {
    pub fn new(preprocessor: ColumnTransformer, regressor: GradientBoostingRegressor) -> Self {
        Self {
            preprocessor,
            regressor,
        }
    }

    pub fn preprocessor(&self) -> &ColumnTransformer {
        &self.preprocessor
    }

    pub fn regressor(&self) -> &GradientBoostingRegressor {
        &self.regressor
    }

    /// Check that the two stages agree on the transformed width
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.regressor.is_fitted() {
            return Err(DomainError::configuration("Pipeline regressor has no fitted trees"));
        }

        let produced = self.preprocessor.n_features_out();
        let consumed = self.regressor.n_features();
        if produced != consumed {
            return Err(DomainError::configuration(format!(
                "Preprocessing produces {} features but the regressor expects {}",
                produced, consumed
            )));
        }

        Ok(())
    }

    pub fn predict_row(&self, row: &FeatureRow) -> Result<f64, DomainError> {
        let features = self.preprocessor.transform_row(row)?;
        let prediction = self.regressor.predict_row(ArrayView1::from(&features[..]))?;

        if !prediction.is_finite() {
            return Err(DomainError::inference(
                "NonFinitePrediction",
                format!("model produced {}", prediction),
            ));
        }

        Ok(prediction)
    }

    pub fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, DomainError> {
        let x = self.preprocessor.transform(rows)?;
        Ok(self.regressor.predict(&x)?.to_vec())
    }
}

/// Persisted training output consumed by the prediction service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub target_column: String,
    pub validation_rmse: f64,
    pub pipeline: PricePipeline,
}

impl PipelineArtifact {
    pub fn new(pipeline: PricePipeline, target_column: impl Into<String>, validation_rmse: f64) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            created_at: Utc::now(),
            target_column: target_column.into(),
            validation_rmse,
            pipeline,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(DomainError::configuration(format!(
                "Artifact format version {} is not supported (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        self.pipeline.validate()
    }
}
