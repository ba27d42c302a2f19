//! Shared fixtures for unit tests

use crate::domain::dataset::Dataset;
use crate::domain::pipeline::PipelineArtifact;
use crate::domain::regressor::GradientBoostingConfig;
use crate::domain::training::{build_pipeline, export, fit, infer_column_roles, FitOptions};

const NEIGHBORHOODS: [&str; 4] = ["CollgCr", "Veenker", "OldTown", "NoRidge"];

fn cell(value: impl ToString) -> Option<String> {
    Some(value.to_string())
}

/// 40 Kaggle-style rows: LotArea, Neighborhood, OverallQual, PoolQC (always empty), SalePrice
pub fn sample_dataset() -> Dataset {
    house_dataset(true)
}

/// Only LotArea, Neighborhood and SalePrice
pub fn two_column_dataset() -> Dataset {
    house_dataset(false)
}

fn house_dataset(with_extras: bool) -> Dataset {
    let mut columns = vec!["LotArea".to_string(), "Neighborhood".to_string()];
    if with_extras {
        columns.push("OverallQual".to_string());
        columns.push("PoolQC".to_string());
    }
    columns.push("SalePrice".to_string());

    let rows = (0..40usize)
        .map(|i| {
            let lot = 7000 + (i * 373) % 5000;
            let hood_index = i % NEIGHBORHOODS.len();
            let quality = 4 + i % 6;
            let price = 50_000 + lot * 10 + quality * 15_000 + hood_index * 20_000;

            let mut row = vec![
                if i % 9 == 0 { None } else { cell(lot) },
                if i % 11 == 5 { None } else { cell(NEIGHBORHOODS[hood_index]) },
            ];
            if with_extras {
                row.push(cell(quality));
                row.push(None);
            }
            row.push(cell(price));
            row
        })
        .collect();

    Dataset::new(columns, rows).expect("fixture rows match columns")
}

pub fn small_regressor_config() -> GradientBoostingConfig {
    GradientBoostingConfig {
        n_estimators: 25,
        max_depth: 3,
        learning_rate: 0.1,
        ..Default::default()
    }
}

pub fn artifact_for(dataset: &Dataset) -> PipelineArtifact {
    let schema = infer_column_roles(dataset, "SalePrice").expect("target present");
    let spec = build_pipeline(schema, small_regressor_config());
    let fitted = fit(&spec, dataset, "SalePrice", FitOptions::default()).expect("fit succeeds");
    export(fitted, &spec, dataset, "SalePrice")
        .expect("export succeeds")
        .artifact
}

/// Artifact whose raw column contract is `["LotArea", "Neighborhood"]`
pub fn two_column_artifact() -> PipelineArtifact {
    artifact_for(&two_column_dataset())
}

/// Same artifact with the raw column contract stripped, as older exports were
pub fn uncontracted_two_column_artifact() -> PipelineArtifact {
    let mut value = serde_json::to_value(two_column_artifact()).expect("artifact serializes");
    value["pipeline"]["preprocessor"]
        .as_object_mut()
        .expect("preprocessor is an object")
        .remove("feature_names_in");
    serde_json::from_value(value).expect("artifact without contract deserializes")
}

/// MSSubClass mixes numeric-looking codes with text, so it is categorical
pub fn building_class_dataset() -> Dataset {
    let columns = ["LotArea", "MSSubClass", "SalePrice"]
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = (0..30usize)
        .map(|i| {
            let class = i % 3;
            vec![
                cell(6000 + i * 250),
                cell(["20", "60", "RL"][class]),
                cell(100_000 + class * 40_000 + i * 500),
            ]
        })
        .collect();

    Dataset::new(columns, rows).expect("fixture rows match columns")
}
