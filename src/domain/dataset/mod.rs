//! Labeled tabular dataset used by the training run

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::domain::DomainError;
use crate::domain::feature::{ColumnRole, FeatureRow, FeatureSchema, FeatureValue, RawColumn};

/// Raw text cells by row; `None` is a missing cell
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self, DomainError> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DomainError::dataset(format!(
                "Row {} has {} cells, expected {}",
                index + 1,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Infer the role of every column except `target`.
    ///
    /// A column whose present cells all parse as finite numbers is numeric, a
    /// column with at least one non-numeric cell is categorical, and a column
    /// with no present cell at all is ignored.
    pub fn infer_schema(&self, target: &str) -> Result<FeatureSchema, DomainError> {
        let target_index = self.column_index(target).ok_or_else(|| {
            DomainError::configuration(format!(
                "Dataset must contain the target column '{}'",
                target
            ))
        })?;

        let columns = self
            .columns
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != target_index)
            .map(|(index, name)| RawColumn::new(name.clone(), self.column_role(index)))
            .collect();

        Ok(FeatureSchema::new(columns))
    }

    fn column_role(&self, index: usize) -> ColumnRole {
        let mut present = self.rows.iter().filter_map(|row| row[index].as_deref()).peekable();

        if present.peek().is_none() {
            return ColumnRole::Ignored;
        }

        if present.all(|cell| parse_number(cell).is_some()) {
            ColumnRole::Numeric
        } else {
            ColumnRole::Categorical
        }
    }

    /// Target values for the given rows; every one must be a finite number
    pub fn target(&self, target: &str, indices: &[usize]) -> Result<Vec<f64>, DomainError> {
        let column = self.column_index(target).ok_or_else(|| {
            DomainError::configuration(format!(
                "Dataset must contain the target column '{}'",
                target
            ))
        })?;

        indices
            .iter()
            .map(|&row| {
                self.rows[row][column]
                    .as_deref()
                    .and_then(parse_number)
                    .ok_or_else(|| {
                        DomainError::dataset(format!(
                            "Target '{}' is missing or not numeric in row {}",
                            target,
                            row + 1
                        ))
                    })
            })
            .collect()
    }

    /// Typed feature rows in schema order for the given row indices
    pub fn feature_rows(
        &self,
        schema: &FeatureSchema,
        indices: &[usize],
    ) -> Result<Vec<FeatureRow>, DomainError> {
        let positions = schema
            .columns()
            .iter()
            .map(|column| {
                self.column_index(&column.name)
                    .map(|index| (column, index))
                    .ok_or_else(|| {
                        DomainError::dataset(format!("Column '{}' not in dataset", column.name))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(indices
            .iter()
            .map(|&row| {
                let cells = positions
                    .iter()
                    .map(|(column, index)| {
                        let value = self.rows[row][*index]
                            .as_deref()
                            .and_then(|cell| typed_cell(cell, column.role));
                        (column.name.clone(), value)
                    })
                    .collect();
                FeatureRow::new(cells)
            })
            .collect())
    }

    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }
}

/// Seeded shuffle split into `(train, test)` row indices.
///
/// The test fraction is rounded up; both sides must end up non-empty.
pub fn train_test_split(
    n_rows: usize,
    test_size: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), DomainError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DomainError::configuration(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let n_test = (n_rows as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(DomainError::dataset(format!(
            "Cannot split {} rows with test_size {}",
            n_rows, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok((train, indices))
}

fn typed_cell(cell: &str, role: ColumnRole) -> Option<FeatureValue> {
    match role {
        ColumnRole::Numeric => parse_number(cell).map(FeatureValue::Number),
        ColumnRole::Categorical | ColumnRole::Ignored => Some(FeatureValue::Text(cell.to_string())),
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
