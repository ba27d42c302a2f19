//! Missing-value imputation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Replaces missing numbers with the training median
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianImputer {
    statistic: f64,
}

impl MedianImputer {
    /// Fit on the observed values; an all-missing column falls back to 0.0
    pub fn fit(values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let mut observed: Vec<f64> = values.into_iter().flatten().collect();
        Self {
            statistic: median(&mut observed).unwrap_or(0.0),
        }
    }

    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn transform(&self, value: Option<f64>) -> f64 {
        value.unwrap_or(self.statistic)
    }
}

/// Replaces missing categories with the most frequent training value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostFrequentImputer {
    statistic: String,
}

/// Fill value for a categorical column that had no observed value at all
pub const MISSING_CATEGORY: &str = "missing";

impl MostFrequentImputer {
    /// Ties resolve to the lexicographically smallest value
    pub fn fit<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.into_iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }

        // BTreeMap iterates in ascending key order, so the first maximum wins
        let statistic = counts
            .iter()
            .fold(None::<(&str, usize)>, |best, (&value, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((value, count)),
            })
            .map(|(value, _)| value.to_string())
            .unwrap_or_else(|| MISSING_CATEGORY.to_string());

        Self { statistic }
    }

    pub fn statistic(&self) -> &str {
        &self.statistic
    }

    pub fn transform<'a>(&'a self, value: Option<&'a str>) -> &'a str {
        value.unwrap_or(self.statistic.as_str())
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
