//! CSV dataset loading

use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::domain::{Dataset, DomainError};

/// Cell tokens read as missing values
const NA_TOKENS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

fn is_missing(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

/// Load a headed CSV file into a [`Dataset`]
pub fn load_csv(path: &Path) -> Result<Dataset, DomainError> {
    if !path.exists() {
        return Err(DomainError::configuration(format!(
            "Missing {}. Put the training CSV there",
            path.display()
        )));
    }

    let file = std::fs::File::open(path).map_err(|e| {
        DomainError::dataset(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let dataset = read_csv(file)?;

    info!(
        path = %path.display(),
        rows = dataset.n_rows(),
        columns = dataset.n_columns(),
        "Loaded dataset"
    );

    Ok(dataset)
}

/// Parse CSV text from any reader; the first record is the header
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DomainError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| DomainError::dataset(format!("Failed to read CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    if columns.is_empty() || columns.iter().all(String::is_empty) {
        return Err(DomainError::dataset("CSV file has no header row"));
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            DomainError::dataset(format!("Failed to read CSV record {}: {}", line + 1, e))
        })?;

        let row = record
            .iter()
            .map(|cell| (!is_missing(cell)).then(|| cell.to_string()))
            .collect();
        rows.push(row);
    }

    Dataset::new(columns, rows)
}
