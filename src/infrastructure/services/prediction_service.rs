//! Prediction service - loaded pipeline plus its raw column contract

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::domain::feature::{align, FeatureMap, FeatureRow, FeatureSchema};
use crate::domain::{DomainError, PipelineArtifact};
use crate::infrastructure::artifact::FileArtifactStore;
use crate::infrastructure::observability::{record_prediction, PredictionOutcome};

/// Liveness summary of the loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceHealth {
    pub model_loaded: bool,
    pub has_preprocessing: bool,
    pub expected_column_count: Option<usize>,
}

/// Read-only inference context.
///
/// Only constructible from a validated artifact, so every instance is ready
/// to serve.
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifact: PipelineArtifact,
    /// Raw columns with roles; `None` when the artifact recorded no contract
    schema: Option<FeatureSchema>,
}

impl PredictionService {
    /// Load the artifact from disk
    pub fn load(path: &Path) -> Result<Self, DomainError> {
        let artifact = FileArtifactStore::new(path).load()?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: PipelineArtifact) -> Result<Self, DomainError> {
        artifact.validate()?;

        let schema = artifact.pipeline.preprocessor().schema();
        match &schema {
            Some(schema) => info!(
                expected_columns = schema.len(),
                "Model expects {} raw columns",
                schema.len()
            ),
            None => warn!(
                "Pipeline recorded no input columns; requests will not be aligned and /columns is unavailable"
            ),
        }

        Ok(Self { artifact, schema })
    }

    pub fn artifact(&self) -> &PipelineArtifact {
        &self.artifact
    }

    pub fn expected_columns(&self) -> Option<&[String]> {
        self.artifact.pipeline.preprocessor().feature_names_in()
    }

    /// Predict a price for a partial feature map
    pub fn predict(&self, features: &FeatureMap) -> Result<f64, DomainError> {
        let start = Instant::now();

        let preprocessor = self.artifact.pipeline.preprocessor();

        let (row, missing) = match (&self.schema, self.expected_columns()) {
            (Some(schema), Some(expected)) => {
                let alignment = align(features, expected);
                if !alignment.missing.is_empty() {
                    debug!(columns = ?alignment.missing, "Missing columns filled with missing marker");
                }
                if !alignment.ignored.is_empty() {
                    debug!(columns = ?alignment.ignored, "Ignoring unexpected columns");
                }

                let row = preprocessor.coerce_categories(&alignment.row);
                if let Err(e) = schema.check_types(&row) {
                    record_prediction(
                        PredictionOutcome::InvalidInput,
                        alignment.missing.len(),
                        start.elapsed(),
                    );
                    return Err(e);
                }

                (row, alignment.missing.len())
            }
            _ => (preprocessor.coerce_categories(&FeatureRow::from_map(features)), 0),
        };

        match self.artifact.pipeline.predict_row(&row) {
            Ok(prediction) => {
                record_prediction(PredictionOutcome::Success, missing, start.elapsed());
                Ok(prediction)
            }
            Err(e) => {
                warn!(error = %e, "Model prediction failed");
                record_prediction(PredictionOutcome::InferenceError, missing, start.elapsed());
                Err(e)
            }
        }
    }

    /// Ordered raw column names the model expects
    pub fn describe_schema(&self) -> Result<Vec<String>, DomainError> {
        self.expected_columns()
            .map(<[String]>::to_vec)
            .ok_or_else(|| DomainError::configuration("Could not determine training raw columns"))
    }

    pub fn health(&self) -> ServiceHealth {
        ServiceHealth {
            model_loaded: true,
            has_preprocessing: true,
            expected_column_count: self.expected_columns().map(<[String]>::len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureValue;
    use crate::test_support::{
        artifact_for, building_class_dataset, sample_dataset, two_column_artifact,
        uncontracted_two_column_artifact,
    };

    fn request(entries: &[(&str, Option<FeatureValue>)]) -> FeatureMap {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    fn service() -> PredictionService {
        PredictionService::from_artifact(two_column_artifact()).unwrap()
    }

    #[test]
    fn test_schema_matches_health_count() {
        let service = PredictionService::from_artifact(artifact_for(&sample_dataset())).unwrap();

        let columns = service.describe_schema().unwrap();

        assert!(!columns.is_empty());
        assert_eq!(Some(columns.len()), service.health().expected_column_count);
        assert!(service.health().model_loaded);
        assert!(service.health().has_preprocessing);
    }

    #[test]
    fn test_two_column_contract() {
        assert_eq!(
            service().describe_schema().unwrap(),
            vec!["LotArea".to_string(), "Neighborhood".to_string()]
        );
    }

    #[test]
    fn test_strict_subset_predicts_finite() {
        let prediction = service()
            .predict(&request(&[("LotArea", Some(8450.0.into()))]))
            .unwrap();

        assert!(prediction.is_finite());
    }

    #[test]
    fn test_empty_request_predicts_finite() {
        let prediction = service().predict(&FeatureMap::new()).unwrap();

        assert!(prediction.is_finite());
    }

    #[test]
    fn test_extra_keys_do_not_change_result() {
        let service = service();
        let base = request(&[
            ("LotArea", Some(8450.0.into())),
            ("Neighborhood", Some("CollgCr".into())),
        ]);
        let mut extended = base.clone();
        extended.insert("Unused".to_string(), Some(1.0.into()));

        assert_eq!(
            service.predict(&base).unwrap(),
            service.predict(&extended).unwrap()
        );
    }

    #[test]
    fn test_key_order_does_not_change_result() {
        let service = service();
        let row = FeatureRow::new(vec![
            ("Neighborhood".to_string(), Some("Veenker".into())),
            ("LotArea".to_string(), Some(9600.0.into())),
        ]);
        let forward: FeatureMap = row.cells().iter().cloned().collect();
        let reversed: FeatureMap = row.cells().iter().rev().cloned().collect();

        assert_eq!(
            service.predict(&forward).unwrap(),
            service.predict(&reversed).unwrap()
        );
    }

    #[test]
    fn test_identical_requests_are_reproducible() {
        let service = service();
        let features = request(&[
            ("LotArea", Some(8450.0.into())),
            ("Neighborhood", Some("CollgCr".into())),
            ("Unused", Some(1.0.into())),
        ]);

        let first = service.predict(&features).unwrap();
        let second = service.predict(&features).unwrap();

        assert!(first.is_finite());
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_category_is_accepted() {
        let prediction = service()
            .predict(&request(&[("Neighborhood", Some("Atlantis".into()))]))
            .unwrap();

        assert!(prediction.is_finite());
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let error = service()
            .predict(&request(&[("LotArea", Some("large".into()))]))
            .unwrap_err();

        match error {
            DomainError::InvalidFeature { column, .. } => assert_eq!(column, "LotArea"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mismatch_in_ignored_key_is_not_checked() {
        let prediction = service()
            .predict(&request(&[("Unused", Some("anything".into()))]))
            .unwrap();

        assert!(prediction.is_finite());
    }

    #[test]
    fn test_uncontracted_artifact_serves_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        FileArtifactStore::new(&path)
            .save(&uncontracted_two_column_artifact())
            .unwrap();

        let service = PredictionService::load(&path).unwrap();

        assert_eq!(service.health().expected_column_count, None);
        assert!(matches!(
            service.describe_schema(),
            Err(DomainError::Configuration { .. })
        ));

        let prediction = service
            .predict(&request(&[("LotArea", Some(8450.0.into()))]))
            .unwrap();
        assert!(prediction.is_finite());

        match service.predict(&request(&[("LotArea", Some("big".into()))])) {
            Err(DomainError::Inference { category, .. }) => assert_eq!(category, "TypeError"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_number_matching_category_is_read_as_text() {
        let dataset = building_class_dataset();
        let service = PredictionService::from_artifact(artifact_for(&dataset)).unwrap();

        let as_number = service
            .predict(&request(&[("MSSubClass", Some(60.0.into()))]))
            .unwrap();
        let as_text = service
            .predict(&request(&[("MSSubClass", Some("60".into()))]))
            .unwrap();
        assert_eq!(as_number, as_text);

        match service.predict(&request(&[("MSSubClass", Some(90.0.into()))])) {
            Err(DomainError::InvalidFeature { column, .. }) => assert_eq!(column, "MSSubClass"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_load_absent_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();

        let error = PredictionService::load(&dir.path().join("missing.json")).unwrap_err();

        assert!(matches!(error, DomainError::Configuration { .. }));
    }
}
