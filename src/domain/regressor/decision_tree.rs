//! Regression tree fitted on boosting residuals

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Minimum gain for a split to be kept
const MIN_SPLIT_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// `feature_idx` indexes the full feature vector, not a column subsample
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<TreeNode>,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// L2 penalty on leaf values; 0.0 gives plain mean leaves
    pub reg_lambda: f64,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self::new()
    }
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: 6,
            min_samples_leaf: 1,
            reg_lambda: 0.0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_reg_lambda(mut self, reg_lambda: f64) -> Self {
        self.reg_lambda = reg_lambda.max(0.0);
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), DomainError> {
        if x.nrows() != y.len() {
            return Err(DomainError::training(format!(
                "Feature rows ({}) and targets ({}) differ in length",
                x.nrows(),
                y.len()
            )));
        }

        let targets = y.to_vec();
        let rows: Vec<usize> = (0..x.nrows()).collect();
        let columns: Vec<usize> = (0..x.ncols()).collect();
        self.fit_subset(x.view(), &targets, &rows, &columns)
    }

    /// Fit on a subset of rows and candidate columns of `x`
    pub fn fit_subset(
        &mut self,
        x: ArrayView2<f64>,
        targets: &[f64],
        rows: &[usize],
        columns: &[usize],
    ) -> Result<(), DomainError> {
        if rows.is_empty() {
            return Err(DomainError::training("Cannot fit a tree on zero rows"));
        }

        self.root = Some(self.build(x, targets, rows.to_vec(), columns, 0));
        Ok(())
    }

    fn build(
        &self,
        x: ArrayView2<f64>,
        targets: &[f64],
        rows: Vec<usize>,
        columns: &[usize],
        depth: usize,
    ) -> TreeNode {
        let n_samples = rows.len();
        let sum: f64 = rows.iter().map(|&i| targets[i]).sum();

        let can_split = depth < self.max_depth && n_samples >= 2 * self.min_samples_leaf;
        let best = if can_split {
            self.find_best_split(x, targets, &rows, columns, sum)
        } else {
            None
        };

        let Some(split) = best else {
            return TreeNode::Leaf {
                value: self.leaf_value(sum, n_samples),
                n_samples,
            };
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&i| x[[i, split.feature_idx]] <= split.threshold);

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: Box::new(self.build(x, targets, left_rows, columns, depth + 1)),
            right: Box::new(self.build(x, targets, right_rows, columns, depth + 1)),
            n_samples,
        }
    }

    fn find_best_split(
        &self,
        x: ArrayView2<f64>,
        targets: &[f64],
        rows: &[usize],
        columns: &[usize],
        total_sum: f64,
    ) -> Option<SplitCandidate> {
        let n = rows.len();
        let parent_score = self.score(total_sum, n);

        let candidates: Vec<Option<SplitCandidate>> = columns
            .par_iter()
            .map(|&feature_idx| {
                let mut pairs: Vec<(f64, f64)> = rows
                    .iter()
                    .map(|&i| (x[[i, feature_idx]], targets[i]))
                    .collect();
                pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

                let mut best: Option<SplitCandidate> = None;
                let mut left_sum = 0.0;

                for k in 0..n - 1 {
                    left_sum += pairs[k].1;
                    let left_n = k + 1;
                    let right_n = n - left_n;

                    if pairs[k].0 >= pairs[k + 1].0 {
                        continue;
                    }
                    if left_n < self.min_samples_leaf || right_n < self.min_samples_leaf {
                        continue;
                    }

                    let gain = self.score(left_sum, left_n)
                        + self.score(total_sum - left_sum, right_n)
                        - parent_score;

                    if gain > MIN_SPLIT_GAIN && best.as_ref().is_none_or(|b| gain > b.gain) {
                        best = Some(SplitCandidate {
                            feature_idx,
                            threshold: (pairs[k].0 + pairs[k + 1].0) / 2.0,
                            gain,
                        });
                    }
                }

                best
            })
            .collect();

        // Sequential reduction keeps ties on the earliest candidate column
        candidates.into_iter().flatten().fold(None, |best, candidate| match best {
            Some(b) if b.gain >= candidate.gain => Some(b),
            _ => Some(candidate),
        })
    }

    fn score(&self, sum: f64, count: usize) -> f64 {
        sum * sum / (count as f64 + self.reg_lambda)
    }

    fn leaf_value(&self, sum: f64, count: usize) -> f64 {
        let denominator = count as f64 + self.reg_lambda;
        if denominator > 0.0 { sum / denominator } else { 0.0 }
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> Result<f64, DomainError> {
        let mut node = self
            .root
            .as_ref()
            .ok_or_else(|| DomainError::inference("NotFitted", "regression tree is not fitted"))?;

        loop {
            match node {
                TreeNode::Leaf { value, .. } => return Ok(*value),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = row.get(*feature_idx).copied().ok_or_else(|| {
                        DomainError::inference(
                            "ShapeMismatch",
                            format!("tree splits on feature {} but row has {}", feature_idx, row.len()),
                        )
                    })?;
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, DomainError> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_row(row))
            .collect::<Result<Vec<_>, _>>()
            .map(Array1::from_vec)
    }

    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }

    pub fn n_leaves(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => count(left) + count(right),
            }
        }
        self.root.as_ref().map_or(0, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regressor_fits_step_function() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = array![10.0, 10.0, 10.0, 20.0, 20.0, 20.0];

        let mut tree = RegressionTree::new().with_max_depth(1);
        tree.fit(&x, &y).unwrap();

        let predictions = tree.predict(&x).unwrap();
        assert_eq!(predictions, y);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn test_max_depth_respected() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0], [5.0, 5.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];

        let mut tree = RegressionTree::new().with_max_depth(2);
        tree.fit(&x, &y).unwrap();

        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![4.0, 4.0, 4.0];

        let mut tree = RegressionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_reg_lambda_shrinks_leaves() {
        let x = array![[1.0], [2.0]];
        let y = array![6.0, 6.0];

        let mut tree = RegressionTree::new().with_reg_lambda(1.0);
        tree.fit(&x, &y).unwrap();

        // 12 / (2 + 1)
        assert_eq!(tree.predict(&x).unwrap()[0], 4.0);
    }

    #[test]
    fn test_min_samples_leaf_blocks_small_splits() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![0.0, 0.0, 9.0];

        let mut tree = RegressionTree::new().with_min_samples_leaf(2);
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.n_leaves(), 1);
    }

    #[test]
    fn test_subset_split_uses_full_feature_index() {
        let x = array![[0.0, 1.0], [0.0, 2.0], [0.0, 3.0], [0.0, 4.0]];
        let targets = [1.0, 1.0, 5.0, 5.0];

        let mut tree = RegressionTree::new();
        tree.fit_subset(x.view(), &targets, &[0, 1, 2, 3], &[1]).unwrap();

        assert_eq!(tree.predict_row(x.row(3)).unwrap(), 5.0);
        assert_eq!(tree.predict_row(x.row(0)).unwrap(), 1.0);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let tree = RegressionTree::new();
        let x = array![[1.0]];
        assert!(matches!(
            tree.predict(&x),
            Err(DomainError::Inference { .. })
        ));
    }

    #[test]
    fn test_fit_rejects_length_mismatch() {
        let x = array![[1.0], [2.0]];
        let y = array![1.0];
        assert!(RegressionTree::new().fit(&x, &y).is_err());
    }
}
