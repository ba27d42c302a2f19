//! Raw feature schema: ordered column names with their training-time roles

use serde::{Deserialize, Serialize};

use super::row::FeatureRow;
use super::value::FeatureValue;
use crate::domain::DomainError;

/// Role a raw column plays in the preprocessing stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    /// Median-imputed numeric feature
    Numeric,
    /// Mode-imputed, one-hot encoded feature
    Categorical,
    /// Neither numeric nor categorical; dropped by the preprocessing stage
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawColumn {
    pub name: String,
    pub role: ColumnRole,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Ordered raw columns fixed at training time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<RawColumn>,
}

impl FeatureSchema {
    pub fn new(columns: Vec<RawColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    /// Raw column names in training order
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.names_with_role(ColumnRole::Numeric)
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.names_with_role(ColumnRole::Categorical)
    }

    pub fn role_of(&self, column: &str) -> Option<ColumnRole> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.role)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Reject values whose type contradicts the column role.
    ///
    /// Numeric columns only accept finite numbers and categorical columns only
    /// accept text. Missing values and ignored columns always pass.
    pub fn check_types(&self, row: &FeatureRow) -> Result<(), DomainError> {
        for (name, value) in row.cells() {
            let Some(value) = value else { continue };
            let Some(role) = self.role_of(name) else { continue };

            match (role, value) {
                (ColumnRole::Numeric, FeatureValue::Number(n)) if !n.is_finite() => {
                    return Err(DomainError::invalid_feature(
                        name,
                        "numeric value must be finite",
                    ));
                }
                (ColumnRole::Numeric, FeatureValue::Text(_)) => {
                    return Err(DomainError::invalid_feature(
                        name,
                        format!(
                            "expected {} value, got {}",
                            role_label(role),
                            value.kind()
                        ),
                    ));
                }
                (ColumnRole::Categorical, FeatureValue::Number(n)) => {
                    return Err(DomainError::invalid_feature(
                        name,
                        format!(
                            "expected {} value, got number {}; numbers are only accepted when they match a known category",
                            role_label(role),
                            n
                        ),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn names_with_role(&self, role: ColumnRole) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.role == role)
            .map(|c| c.name.clone())
            .collect()
    }
}

fn role_label(role: ColumnRole) -> &'static str {
    match role {
        ColumnRole::Numeric => "a numeric",
        ColumnRole::Categorical => "a categorical (text)",
        ColumnRole::Ignored => "an ignored",
    }
}
