//! Ordered single-row table and column alignment

use std::collections::HashMap;

use super::value::{FeatureMap, FeatureValue};

/// An ordered list of `(column, value)` cells; `None` is the missing-value marker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    cells: Vec<(String, Option<FeatureValue>)>,
}

impl FeatureRow {
    pub fn new(cells: Vec<(String, Option<FeatureValue>)>) -> Self {
        Self { cells }
    }

    /// Materialize a request map into a row, in the map's key order
    pub fn from_map(features: &FeatureMap) -> Self {
        Self {
            cells: features
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    /// Re-project this row onto `columns`, in that order.
    ///
    /// Columns present in both are kept, expected columns absent here become
    /// the missing-value marker, and anything not in `columns` is dropped.
    pub fn reindex(&self, columns: &[String]) -> FeatureRow {
        let index: HashMap<&str, &Option<FeatureValue>> = self
            .cells
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();

        let cells = columns
            .iter()
            .map(|column| {
                let value = index.get(column.as_str()).and_then(|value| (*value).clone());
                (column.clone(), value)
            })
            .collect();

        FeatureRow { cells }
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn cells(&self) -> &[(String, Option<FeatureValue>)] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|(_, value)| value.is_none()).count()
    }
}

/// Result of aligning a request map onto the expected raw columns
#[derive(Debug, Clone)]
pub struct Alignment {
    pub row: FeatureRow,
    /// Expected columns the request did not supply
    pub missing: Vec<String>,
    /// Request keys that are not part of the expected columns
    pub ignored: Vec<String>,
}

/// Align `features` onto `expected`: see [`FeatureRow::reindex`]
pub fn align(features: &FeatureMap, expected: &[String]) -> Alignment {
    let row = FeatureRow::from_map(features).reindex(expected);

    let missing = expected
        .iter()
        .filter(|column| !features.contains_key(column.as_str()))
        .cloned()
        .collect();

    let ignored = features
        .keys()
        .filter(|key| !expected.iter().any(|column| column == *key))
        .cloned()
        .collect();

    Alignment {
        row,
        missing,
        ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn map(entries: &[(&str, Option<FeatureValue>)]) -> FeatureMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_reindex_follows_expected_order() {
        let features = map(&[
            ("Neighborhood", Some("CollgCr".into())),
            ("LotArea", Some(8450.0.into())),
        ]);

        let alignment = align(&features, &columns(&["LotArea", "Neighborhood"]));

        let names: Vec<&str> = alignment.row.names().collect();
        assert_eq!(names, vec!["LotArea", "Neighborhood"]);
        assert_eq!(alignment.row.get("LotArea"), Some(&FeatureValue::Number(8450.0)));
    }

    #[test]
    fn test_missing_columns_become_marker() {
        let features = map(&[("LotArea", Some(8450.0.into()))]);

        let alignment = align(&features, &columns(&["LotArea", "Neighborhood"]));

        assert_eq!(alignment.row.len(), 2);
        assert_eq!(alignment.row.get("Neighborhood"), None);
        assert_eq!(alignment.row.missing_count(), 1);
        assert_eq!(alignment.missing, columns(&["Neighborhood"]));
        assert!(alignment.ignored.is_empty());
    }

    #[test]
    fn test_extra_columns_are_dropped() {
        let features = map(&[
            ("LotArea", Some(8450.0.into())),
            ("Unused", Some(1.0.into())),
        ]);

        let alignment = align(&features, &columns(&["LotArea"]));

        assert_eq!(alignment.row.len(), 1);
        assert_eq!(alignment.ignored, columns(&["Unused"]));
        assert!(alignment.row.names().all(|n| n != "Unused"));
    }

    #[test]
    fn test_explicit_null_counts_as_supplied_but_missing_value() {
        let features = map(&[("Alley", None)]);

        let alignment = align(&features, &columns(&["Alley"]));

        assert!(alignment.missing.is_empty());
        assert_eq!(alignment.row.get("Alley"), None);
    }

    #[test]
    fn test_alignment_is_order_independent() {
        let expected = columns(&["A", "B", "C"]);
        let first = FeatureRow::new(vec![
            ("C".to_string(), Some(3.0.into())),
            ("A".to_string(), Some(1.0.into())),
        ]);
        let second = FeatureRow::new(vec![
            ("A".to_string(), Some(1.0.into())),
            ("C".to_string(), Some(3.0.into())),
        ]);

        assert_eq!(first.reindex(&expected), second.reindex(&expected));
    }

    #[test]
    fn test_reindex_onto_empty_schema() {
        let row = FeatureRow::new(vec![("A".to_string(), Some(1.0.into()))]);
        assert!(row.reindex(&[]).is_empty());
    }
}
