//! Human-readable schema helpers written next to the training data

use std::path::{Path, PathBuf};

use tracing::info;

use super::store::write_atomic;
use crate::domain::DomainError;

pub const COLUMNS_FILE: &str = "columns.json";
pub const PREPROCESSED_SAMPLE_FILE: &str = "X_preprocessed.csv";

/// Rendered schema files, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaFiles {
    pub columns_json: String,
    pub preprocessed_csv: String,
}

impl SchemaFiles {
    /// Render both files for the given post-transform column names
    pub fn render(columns: &[String]) -> Result<Self, DomainError> {
        let columns_json = serde_json::to_string_pretty(columns).map_err(|e| {
            DomainError::storage(format!("Failed to serialize column names: {}", e))
        })?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        let zeros = vec!["0"; columns.len()];
        writer
            .write_record(columns)
            .and_then(|_| writer.write_record(&zeros))
            .map_err(|e| DomainError::storage(format!("Failed to render CSV sample: {}", e)))?;
        let bytes = writer
            .into_inner()
            .map_err(|e| DomainError::storage(format!("Failed to render CSV sample: {}", e)))?;
        let preprocessed_csv = String::from_utf8(bytes)
            .map_err(|e| DomainError::storage(format!("CSV sample is not UTF-8: {}", e)))?;

        Ok(Self {
            columns_json,
            preprocessed_csv,
        })
    }

    /// Write into `dir`, returning the written paths
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, DomainError> {
        let columns_path = dir.join(COLUMNS_FILE);
        let sample_path = dir.join(PREPROCESSED_SAMPLE_FILE);

        write_atomic(&columns_path, self.columns_json.as_bytes())?;
        write_atomic(&sample_path, self.preprocessed_csv.as_bytes())?;

        info!(
            columns = %columns_path.display(),
            sample = %sample_path.display(),
            "Saved schema files"
        );

        Ok(vec![columns_path, sample_path])
    }
}
