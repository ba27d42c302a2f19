//! One-hot encoding that ignores unknown categories

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Sorted, de-duplicated categories seen during fit
    categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let categories: BTreeSet<&str> = values.into_iter().collect();
        Self {
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Append one indicator per category; an unseen value appends all zeros
    pub fn encode_into(&self, value: &str, out: &mut Vec<f64>) {
        let hit = self
            .categories
            .binary_search_by(|category| category.as_str().cmp(value))
            .ok();

        out.extend((0..self.categories.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
    }

    /// Fitted category spelled like `value`, e.g. `20.0` for a category "20"
    pub fn category_for_number(&self, value: f64) -> Option<&str> {
        if !value.is_finite() {
            return None;
        }

        [value.to_string(), format!("{:?}", value)]
            .into_iter()
            .find_map(|spelling| {
                self.categories
                    .binary_search_by(|category| category.as_str().cmp(spelling.as_str()))
                    .ok()
            })
            .map(|i| self.categories[i].as_str())
    }

    pub fn feature_names_out(&self, column: &str) -> Vec<String> {
        self.categories
            .iter()
            .map(|category| format!("{}_{}", column, category))
            .collect()
    }
}
