//! Tree-based regression model

mod decision_tree;
mod gradient_boosting;

pub use decision_tree::{RegressionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
