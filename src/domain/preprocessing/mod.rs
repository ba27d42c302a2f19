//! Preprocessing stage: imputation and categorical encoding

mod column_transformer;
mod imputer;
mod one_hot;

pub use column_transformer::{CategoricalColumn, ColumnTransformer, NumericColumn, PreprocessorSpec};
pub use imputer::{MedianImputer, MostFrequentImputer, MISSING_CATEGORY};
pub use one_hot::OneHotEncoder;
