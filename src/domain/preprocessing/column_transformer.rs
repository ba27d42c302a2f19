//! Two-branch preprocessing stage: numeric and categorical columns

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::imputer::{MedianImputer, MostFrequentImputer};
use super::one_hot::OneHotEncoder;
use crate::domain::DomainError;
use crate::domain::feature::{ColumnRole, FeatureRow, FeatureSchema, FeatureValue, RawColumn};

/// Unfitted preprocessing stage: which raw columns go through which branch
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessorSpec {
    schema: FeatureSchema,
}

impl PreprocessorSpec {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Fit imputers and encoders on rows laid out in schema order
    pub fn fit(&self, rows: &[FeatureRow]) -> Result<ColumnTransformer, DomainError> {
        if rows.is_empty() {
            return Err(DomainError::training("Cannot fit preprocessing on zero rows"));
        }

        let names = self.schema.names();
        if let Some(row) = rows.iter().find(|row| !row.names().eq(names.iter().map(String::as_str))) {
            return Err(DomainError::training(format!(
                "Training row columns {:?} do not match schema {:?}",
                row.names().collect::<Vec<_>>(),
                names
            )));
        }

        let numeric = self
            .schema
            .numeric_columns()
            .into_iter()
            .map(|name| {
                let imputer =
                    MedianImputer::fit(rows.iter().map(|row| row.get(&name).and_then(FeatureValue::as_number)));
                NumericColumn { name, imputer }
            })
            .collect();

        let categorical = self
            .schema
            .categorical_columns()
            .into_iter()
            .map(|name| {
                let imputer = MostFrequentImputer::fit(
                    rows.iter().map(|row| row.get(&name).and_then(FeatureValue::as_text)),
                );
                let encoder = OneHotEncoder::fit(
                    rows.iter()
                        .map(|row| imputer.transform(row.get(&name).and_then(FeatureValue::as_text))),
                );
                CategoricalColumn {
                    name,
                    imputer,
                    encoder,
                }
            })
            .collect();

        Ok(ColumnTransformer {
            feature_names_in: Some(names),
            numeric,
            categorical,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    pub name: String,
    pub imputer: MedianImputer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub imputer: MostFrequentImputer,
    pub encoder: OneHotEncoder,
}

/// Fitted preprocessing stage
///
/// `feature_names_in` is the raw column contract: the exact names, in order,
/// that inference rows must be aligned to. Columns listed there but in
/// neither branch are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feature_names_in: Option<Vec<String>>,
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
}

impl ColumnTransformer {
    pub fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    /// Raw schema with roles, when the column contract was recorded
    pub fn schema(&self) -> Option<FeatureSchema> {
        let names = self.feature_names_in.as_ref()?;
        Some(FeatureSchema::new(
            names
                .iter()
                .map(|name| RawColumn::new(name.clone(), self.role_of(name)))
                .collect(),
        ))
    }

    pub fn role_of(&self, column: &str) -> ColumnRole {
        if self.numeric.iter().any(|c| c.name == column) {
            ColumnRole::Numeric
        } else if self.categorical.iter().any(|c| c.name == column) {
            ColumnRole::Categorical
        } else {
            ColumnRole::Ignored
        }
    }

    /// Post-transform names: numeric columns, then `<column>_<category>` indicators
    pub fn feature_names_out(&self) -> Vec<String> {
        self.numeric
            .iter()
            .map(|c| c.name.clone())
            .chain(
                self.categorical
                    .iter()
                    .flat_map(|c| c.encoder.feature_names_out(&c.name)),
            )
            .collect()
    }

    pub fn n_features_out(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.encoder.width()).sum::<usize>()
    }

    /// Numbers sent for a categorical column become text when they spell a fitted
    /// category; anything else is left for the type check to reject
    pub fn coerce_categories(&self, row: &FeatureRow) -> FeatureRow {
        FeatureRow::new(
            row.cells()
                .iter()
                .map(|(name, value)| {
                    let category = match value {
                        Some(FeatureValue::Number(n)) => self
                            .categorical
                            .iter()
                            .find(|c| &c.name == name)
                            .and_then(|c| c.encoder.category_for_number(*n)),
                        _ => None,
                    };
                    let value = match category {
                        Some(category) => Some(FeatureValue::from(category)),
                        None => value.clone(),
                    };
                    (name.clone(), value)
                })
                .collect(),
        )
    }

    /// Transform one row into the model's numeric feature vector
    pub fn transform_row(&self, row: &FeatureRow) -> Result<Vec<f64>, DomainError> {
        if let Some(expected) = &self.feature_names_in {
            if !row.names().eq(expected.iter().map(String::as_str)) {
                return Err(DomainError::inference(
                    "FeatureNamesMismatch",
                    format!(
                        "row columns {:?} do not match the {} columns seen during fit",
                        row.names().collect::<Vec<_>>(),
                        expected.len()
                    ),
                ));
            }
        }

        let mut out = Vec::with_capacity(self.n_features_out());

        for column in &self.numeric {
            let value = match row.get(&column.name) {
                None => None,
                Some(FeatureValue::Number(n)) if n.is_finite() => Some(*n),
                Some(FeatureValue::Number(n)) => {
                    return Err(DomainError::inference(
                        "ValueError",
                        format!("column '{}' has non-finite value {}", column.name, n),
                    ));
                }
                Some(FeatureValue::Text(text)) => {
                    return Err(DomainError::inference(
                        "TypeError",
                        format!("column '{}' expects a number, got text '{}'", column.name, text),
                    ));
                }
            };
            out.push(column.imputer.transform(value));
        }

        for column in &self.categorical {
            let value = match row.get(&column.name) {
                None => None,
                Some(FeatureValue::Text(text)) => Some(text.as_str()),
                Some(FeatureValue::Number(n)) => {
                    return Err(DomainError::inference(
                        "TypeError",
                        format!("column '{}' expects a category, got number {}", column.name, n),
                    ));
                }
            };
            column.encoder.encode_into(column.imputer.transform(value), &mut out);
        }

        Ok(out)
    }

    pub fn transform(&self, rows: &[FeatureRow]) -> Result<Array2<f64>, DomainError> {
        let width = self.n_features_out();
        let mut data = Vec::with_capacity(rows.len() * width);

        for row in rows {
            data.extend(self.transform_row(row)?);
        }

        Array2::from_shape_vec((rows.len(), width), data)
            .map_err(|e| DomainError::internal(format!("Failed to shape feature matrix: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            RawColumn::new("LotArea", ColumnRole::Numeric),
            RawColumn::new("Neighborhood", ColumnRole::Categorical),
            RawColumn::new("PoolQC", ColumnRole::Ignored),
        ])
    }

    fn row(lot: Option<f64>, hood: Option<&str>) -> FeatureRow {
        FeatureRow::new(vec![
            ("LotArea".to_string(), lot.map(FeatureValue::Number)),
            ("Neighborhood".to_string(), hood.map(FeatureValue::from)),
            ("PoolQC".to_string(), None),
        ])
    }

    fn fitted() -> ColumnTransformer {
        PreprocessorSpec::new(schema())
            .fit(&[
                row(Some(100.0), Some("b")),
                row(Some(300.0), Some("a")),
                row(None, Some("b")),
                row(Some(200.0), None),
            ])
            .unwrap()
    }

    #[test]
    fn test_feature_names_in_is_raw_schema_order() {
        let transformer = fitted();
        assert_eq!(
            transformer.feature_names_in().unwrap(),
            &["LotArea", "Neighborhood", "PoolQC"]
        );
    }

    #[test]
    fn test_feature_names_out_expands_categories() {
        let transformer = fitted();
        assert_eq!(
            transformer.feature_names_out(),
            vec!["LotArea", "Neighborhood_a", "Neighborhood_b"]
        );
        assert_eq!(transformer.n_features_out(), 3);
    }

    #[test]
    fn test_transform_imputes_missing_values() {
        let transformer = fitted();

        let out = transformer.transform_row(&row(None, None)).unwrap();

        // median of 100/200/300, most frequent category "b"
        assert_eq!(out, vec![200.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transform_unknown_category_is_all_zero() {
        let transformer = fitted();
        let out = transformer.transform_row(&row(Some(50.0), Some("zzz"))).unwrap();
        assert_eq!(out, vec![50.0, 0.0, 0.0]);
    }

    #[test]
    fn test_transform_rejects_unaligned_row() {
        let transformer = fitted();
        let unaligned = FeatureRow::new(vec![("LotArea".to_string(), Some(1.0.into()))]);

        match transformer.transform_row(&unaligned) {
            Err(DomainError::Inference { category, .. }) => {
                assert_eq!(category, "FeatureNamesMismatch")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_transform_rejects_type_mismatch() {
        let transformer = fitted();
        let bad = FeatureRow::new(vec![
            ("LotArea".to_string(), Some("big".into())),
            ("Neighborhood".to_string(), None),
            ("PoolQC".to_string(), None),
        ]);

        match transformer.transform_row(&bad) {
            Err(DomainError::Inference { category, .. }) => assert_eq!(category, "TypeError"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_schema_round_trips_roles() {
        let transformer = fitted();
        assert_eq!(transformer.schema().unwrap(), schema());
    }

    #[test]
    fn test_missing_contract_looks_up_by_name() {
        let mut transformer = fitted();
        transformer.feature_names_in = None;

        let partial = FeatureRow::new(vec![("Neighborhood".to_string(), Some("a".into()))]);

        assert!(transformer.schema().is_none());
        assert_eq!(transformer.transform_row(&partial).unwrap(), vec![200.0, 1.0, 0.0]);
    }

    #[test]
    fn test_coerce_categories_matches_numeric_spelling() {
        let transformer = PreprocessorSpec::new(FeatureSchema::new(vec![
            RawColumn::new("LotArea", ColumnRole::Numeric),
            RawColumn::new("MSSubClass", ColumnRole::Categorical),
        ]))
        .fit(&[
            FeatureRow::new(vec![
                ("LotArea".to_string(), Some(1.0.into())),
                ("MSSubClass".to_string(), Some("20".into())),
            ]),
            FeatureRow::new(vec![
                ("LotArea".to_string(), Some(2.0.into())),
                ("MSSubClass".to_string(), Some("RL".into())),
            ]),
        ])
        .unwrap();

        let sent = FeatureRow::new(vec![
            ("LotArea".to_string(), Some(20.0.into())),
            ("MSSubClass".to_string(), Some(20.0.into())),
        ]);
        let coerced = transformer.coerce_categories(&sent);

        assert_eq!(coerced.get("LotArea"), Some(&FeatureValue::Number(20.0)));
        assert_eq!(coerced.get("MSSubClass"), Some(&FeatureValue::from("20")));
        assert_eq!(
            transformer.transform_row(&coerced).unwrap(),
            vec![20.0, 1.0, 0.0]
        );

        let unknown = FeatureRow::new(vec![
            ("LotArea".to_string(), None),
            ("MSSubClass".to_string(), Some(90.0.into())),
        ]);
        assert_eq!(
            transformer.coerce_categories(&unknown).get("MSSubClass"),
            Some(&FeatureValue::Number(90.0))
        );
    }

    #[test]
    fn test_transform_batch_shape() {
        let transformer = fitted();
        let matrix = transformer
            .transform(&[row(Some(1.0), Some("a")), row(Some(2.0), Some("b"))])
            .unwrap();
        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[1, 0]], 2.0);
    }

    #[test]
    fn test_fit_rejects_empty_rows() {
        assert!(PreprocessorSpec::new(schema()).fit(&[]).is_err());
    }
}
