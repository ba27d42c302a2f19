//! Schema/pipeline builder: role inference, pipeline construction, fit and export

use ndarray::Array1;
use tracing::{debug, info};

use crate::domain::DomainError;
use crate::domain::dataset::{train_test_split, Dataset};
use crate::domain::feature::FeatureSchema;
use crate::domain::pipeline::{PipelineArtifact, PricePipeline};
use crate::domain::preprocessing::PreprocessorSpec;
use crate::domain::regressor::{GradientBoostingConfig, GradientBoostingRegressor};

/// Unfitted pipeline: preprocessing plan plus regressor hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSpec {
    pub preprocessor: PreprocessorSpec,
    pub regressor: GradientBoostingConfig,
}

/// Validation split settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub test_size: f64,
    pub seed: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FittedPipeline {
    pub pipeline: PricePipeline,
    pub validation_rmse: f64,
    pub n_train: usize,
    pub n_validation: usize,
}

/// Everything a training run persists
#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub artifact: PipelineArtifact,
    /// Raw column contract, identical to the pipeline's `feature_names_in`
    pub raw_columns: Vec<String>,
    /// Post-transform names with categories locked on the full dataset
    pub transformed_columns: Vec<String>,
}

/// Partition every non-target column into numeric / categorical / ignored
pub fn infer_column_roles(dataset: &Dataset, target: &str) -> Result<FeatureSchema, DomainError> {
    let schema = dataset.infer_schema(target)?;

    info!(
        numeric = schema.numeric_columns().len(),
        categorical = schema.categorical_columns().len(),
        ignored = schema.len() - schema.numeric_columns().len() - schema.categorical_columns().len(),
        "Inferred column roles"
    );

    Ok(schema)
}

pub fn build_pipeline(schema: FeatureSchema, regressor: GradientBoostingConfig) -> PipelineSpec {
    PipelineSpec {
        preprocessor: PreprocessorSpec::new(schema),
        regressor,
    }
}

/// Fit on a seeded training split and report hold-out RMSE (never gated)
pub fn fit(
    spec: &PipelineSpec,
    dataset: &Dataset,
    target: &str,
    options: FitOptions,
) -> Result<FittedPipeline, DomainError> {
    if dataset.is_empty() {
        return Err(DomainError::dataset("Dataset has no rows"));
    }

    spec.regressor.validate()?;

    let (train_idx, valid_idx) = train_test_split(dataset.n_rows(), options.test_size, options.seed)?;
    debug!(train = train_idx.len(), validation = valid_idx.len(), "Split dataset");

    let schema = spec.preprocessor.schema();
    let train_rows = dataset.feature_rows(schema, &train_idx)?;
    let y_train = Array1::from_vec(dataset.target(target, &train_idx)?);

    let preprocessor = spec.preprocessor.fit(&train_rows)?;
    let x_train = preprocessor.transform(&train_rows)?;

    info!(
        rows = x_train.nrows(),
        features = x_train.ncols(),
        trees = spec.regressor.n_estimators,
        "Fitting gradient boosting regressor"
    );

    let mut regressor = GradientBoostingRegressor::new(spec.regressor.clone());
    regressor.fit(&x_train, &y_train)?;

    let pipeline = PricePipeline::new(preprocessor, regressor);

    let valid_rows = dataset.feature_rows(schema, &valid_idx)?;
    let y_valid = dataset.target(target, &valid_idx)?;
    let predictions = pipeline.predict(&valid_rows)?;
    let validation_rmse = rmse(&y_valid, &predictions);

    info!(rmse = validation_rmse, "Validation RMSE: {:.2}", validation_rmse);

    Ok(FittedPipeline {
        pipeline,
        validation_rmse,
        n_train: train_idx.len(),
        n_validation: valid_idx.len(),
    })
}

/// Lock the column contract and build the artifact.
///
/// The preprocessing stage is re-fitted on the full dataset so the
/// post-transform names cover every observed category; its raw column list
/// must equal the fitted pipeline's `feature_names_in` exactly.
pub fn export(
    fitted: FittedPipeline,
    spec: &PipelineSpec,
    dataset: &Dataset,
    target: &str,
) -> Result<ExportBundle, DomainError> {
    let all_rows = dataset.feature_rows(spec.preprocessor.schema(), &dataset.all_indices())?;
    let full = spec.preprocessor.fit(&all_rows)?;

    let raw_columns = full
        .feature_names_in()
        .map(<[String]>::to_vec)
        .ok_or_else(|| DomainError::training("Full-data preprocessing recorded no input columns"))?;

    let fitted_columns = fitted.pipeline.preprocessor().feature_names_in().ok_or_else(|| {
        DomainError::training("Fitted pipeline preprocessing recorded no input columns")
    })?;

    if raw_columns.as_slice() != fitted_columns {
        return Err(DomainError::training(format!(
            "Column contract violated: exported {:?} but pipeline expects {:?}",
            raw_columns, fitted_columns
        )));
    }

    let transformed_columns = full.feature_names_out();
    info!(
        raw = raw_columns.len(),
        transformed = transformed_columns.len(),
        "Final feature count: {}",
        transformed_columns.len()
    );

    Ok(ExportBundle {
        artifact: PipelineArtifact::new(fitted.pipeline, target, fitted.validation_rmse),
        raw_columns,
        transformed_columns,
    })
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    (sum_sq / actual.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature::{FeatureRow, FeatureValue};
    use crate::test_support::{sample_dataset, small_regressor_config};

    fn spec_for(dataset: &Dataset) -> PipelineSpec {
        let schema = infer_column_roles(dataset, "SalePrice").unwrap();
        build_pipeline(schema, small_regressor_config())
    }

    #[test]
    fn test_rmse() {
        assert_eq!(rmse(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
        assert_eq!(rmse(&[0.0, 0.0], &[3.0, 4.0]), (12.5f64).sqrt());
        assert_eq!(rmse(&[], &[]), 0.0);
    }

    #[test]
    fn test_fit_reports_finite_rmse_and_split_sizes() {
        let dataset = sample_dataset();
        let spec = spec_for(&dataset);

        let fitted = fit(&spec, &dataset, "SalePrice", FitOptions::default()).unwrap();

        assert!(fitted.validation_rmse.is_finite());
        assert_eq!(fitted.n_train + fitted.n_validation, dataset.n_rows());
        assert_eq!(fitted.n_validation, (dataset.n_rows() as f64 * 0.2).ceil() as usize);
        assert!(fitted.pipeline.validate().is_ok());
    }

    #[test]
    fn test_fit_is_reproducible() {
        let dataset = sample_dataset();
        let spec = spec_for(&dataset);

        let first = fit(&spec, &dataset, "SalePrice", FitOptions::default()).unwrap();
        let second = fit(&spec, &dataset, "SalePrice", FitOptions::default()).unwrap();

        assert_eq!(first.pipeline, second.pipeline);
        assert_eq!(first.validation_rmse, second.validation_rmse);
    }

    #[test]
    fn test_export_raw_columns_match_feature_names_in() {
        let dataset = sample_dataset();
        let spec = spec_for(&dataset);
        let fitted = fit(&spec, &dataset, "SalePrice", FitOptions::default()).unwrap();

        let bundle = export(fitted, &spec, &dataset, "SalePrice").unwrap();

        let contract = bundle
            .artifact
            .pipeline
            .preprocessor()
            .feature_names_in()
            .unwrap();
        assert_eq!(bundle.raw_columns.as_slice(), contract);
        assert_eq!(bundle.raw_columns, vec!["LotArea", "Neighborhood", "OverallQual", "PoolQC"]);
        assert_eq!(bundle.artifact.target_column, "SalePrice");
    }

    #[test]
    fn test_export_transformed_columns_cover_all_categories() {
        let dataset = sample_dataset();
        let spec = spec_for(&dataset);
        let fitted = fit(&spec, &dataset, "SalePrice", FitOptions::default()).unwrap();

        let bundle = export(fitted, &spec, &dataset, "SalePrice").unwrap();

        assert_eq!(
            bundle.transformed_columns,
            vec![
                "LotArea",
                "OverallQual",
                "Neighborhood_CollgCr",
                "Neighborhood_NoRidge",
                "Neighborhood_OldTown",
                "Neighborhood_Veenker",
            ]
        );
    }

    #[test]
    fn test_fitted_pipeline_predicts_on_partial_row() {
        let dataset = sample_dataset();
        let spec = spec_for(&dataset);
        let fitted = fit(&spec, &dataset, "SalePrice", FitOptions::default()).unwrap();

        let row = FeatureRow::new(vec![
            ("LotArea".to_string(), Some(FeatureValue::Number(8450.0))),
            ("Neighborhood".to_string(), None),
            ("OverallQual".to_string(), None),
            ("PoolQC".to_string(), None),
        ]);

        let prediction = fitted.pipeline.predict_row(&row).unwrap();
        assert!(prediction.is_finite());
    }

    #[test]
    fn test_fit_fails_on_missing_target() {
        let dataset = sample_dataset();
        let spec = spec_for(&dataset);

        assert!(fit(&spec, &dataset, "Price", FitOptions::default()).is_err());
        assert!(infer_column_roles(&dataset, "Price").is_err());
    }

    #[test]
    fn test_fit_fails_on_empty_dataset() {
        let dataset = Dataset::new(vec!["x".to_string(), "SalePrice".to_string()], vec![]).unwrap();
        let spec = build_pipeline(
            infer_column_roles(&dataset, "SalePrice").unwrap(),
            small_regressor_config(),
        );

        assert!(matches!(
            fit(&spec, &dataset, "SalePrice", FitOptions::default()),
            Err(DomainError::Dataset { .. })
        ));
    }
}
