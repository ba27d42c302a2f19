//! Gradient boosted regression trees (squared error)
//!
//! A small XGBoost-style booster: row and column subsampling per round,
//! L2-regularized leaves and shrinkage. Fitting is deterministic for a
//! given `random_state`.

use ndarray::{Array1, Array2, ArrayView1};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use super::decision_tree::RegressionTree;
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Shrinkage applied to every tree's output
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Row subsample ratio per tree
    pub subsample: f64,
    /// Column subsample ratio per tree
    pub colsample_bytree: f64,
    /// L2 regularization on leaf values
    pub reg_lambda: f64,
    pub random_state: u64,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 700,
            learning_rate: 0.05,
            max_depth: 6,
            min_samples_leaf: 1,
            subsample: 0.8,
            colsample_bytree: 0.8,
            reg_lambda: 1.0,
            random_state: 42,
        }
    }
}

impl GradientBoostingConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.n_estimators == 0 {
            return Err(DomainError::configuration("n_estimators must be at least 1"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(DomainError::configuration("learning_rate must be positive"));
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(DomainError::configuration("subsample must be in (0, 1]"));
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return Err(DomainError::configuration("colsample_bytree must be in (0, 1]"));
        }
        if self.reg_lambda < 0.0 {
            return Err(DomainError::configuration("reg_lambda must not be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    config: GradientBoostingConfig,
    base_score: f64,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl GradientBoostingRegressor {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            base_score: 0.0,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn config(&self) -> &GradientBoostingConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), DomainError> {
        self.config.validate()?;

        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples == 0 {
            return Err(DomainError::training("Cannot fit on an empty training set"));
        }
        if n_features == 0 {
            return Err(DomainError::training("No usable feature columns to fit on"));
        }
        if y.len() != n_samples {
            return Err(DomainError::training(format!(
                "Feature rows ({}) and targets ({}) differ in length",
                n_samples,
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::training("Targets must be finite numbers"));
        }

        self.n_features = n_features;
        self.base_score = y.mean().unwrap_or(0.0);
        self.trees = Vec::with_capacity(self.config.n_estimators);

        let mut predictions = Array1::from_elem(n_samples, self.base_score);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);

        for _ in 0..self.config.n_estimators {
            let residuals: Vec<f64> = y
                .iter()
                .zip(predictions.iter())
                .map(|(yi, pi)| yi - pi)
                .collect();

            let rows = sample_indices(n_samples, self.config.subsample, &mut rng);
            let columns = sample_indices(n_features, self.config.colsample_bytree, &mut rng);

            let mut tree = RegressionTree::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf)
                .with_reg_lambda(self.config.reg_lambda);
            tree.fit_subset(x.view(), &residuals, &rows, &columns)?;

            for (i, row) in x.rows().into_iter().enumerate() {
                predictions[i] += self.config.learning_rate * tree.predict_row(row)?;
            }

            self.trees.push(tree);
        }

        Ok(())
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<f64, DomainError> {
        if !self.is_fitted() {
            return Err(DomainError::inference("NotFitted", "regressor is not fitted"));
        }
        if row.len() != self.n_features {
            return Err(DomainError::inference(
                "ShapeMismatch",
                format!(
                    "regressor expects {} features, got {}",
                    self.n_features,
                    row.len()
                ),
            ));
        }

        let mut prediction = self.base_score;
        for tree in &self.trees {
            prediction += self.config.learning_rate * tree.predict_row(row)?;
        }
        Ok(prediction)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, DomainError> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_row(row))
            .collect::<Result<Vec<_>, _>>()
            .map(Array1::from_vec)
    }
}

/// Sorted random subset of `0..n` of size `ceil(n * ratio)`, at least one
fn sample_indices(n: usize, ratio: f64, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    if ratio >= 1.0 {
        return indices;
    }

    let size = ((n as f64) * ratio).ceil().max(1.0) as usize;
    indices.shuffle(rng);
    indices.truncate(size);
    indices.sort_unstable();
    indices
}
