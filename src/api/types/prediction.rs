//! Request and response bodies for the prediction endpoints

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::FeatureMap;

const WRAPPER_KEY: &str = "features_by_name";

/// Predict body: `{"features_by_name": {...}}` or the bare feature map
#[derive(Debug, Clone, PartialEq)]
pub enum PredictRequest {
    Wrapped { features_by_name: FeatureMap },
    Bare(FeatureMap),
}

impl PredictRequest {
    pub fn into_features(self) -> FeatureMap {
        match self {
            Self::Wrapped { features_by_name } => features_by_name,
            Self::Bare(features) => features,
        }
    }
}

/// A body carrying `features_by_name` is always the wrapped form, so that key
/// must hold an object. Other top-level keys next to it are ignored.
impl<'de> Deserialize<'de> for PredictRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut body = Map::<String, Value>::deserialize(deserializer)?;

        match body.remove(WRAPPER_KEY) {
            Some(Value::Object(features)) => serde_json::from_value(Value::Object(features))
                .map(|features_by_name| Self::Wrapped { features_by_name })
                .map_err(de::Error::custom),
            Some(other) => Err(de::Error::custom(format!(
                "`{}` must be an object mapping feature names to values, got {}",
                WRAPPER_KEY,
                json_kind(&other)
            ))),
            None => serde_json::from_value(Value::Object(body))
                .map(Self::Bare)
                .map_err(de::Error::custom),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnsResponse {
    pub feature_count: usize,
    pub columns: Vec<String>,
}

impl From<Vec<String>> for ColumnsResponse {
    fn from(columns: Vec<String>) -> Self {
        Self {
            feature_count: columns.len(),
            columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub model_loaded: bool,
    pub has_prep: bool,
    pub n_raw_columns_expected: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}
