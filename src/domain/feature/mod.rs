//! Feature values, rows, and the raw column schema

mod row;
mod schema;
mod value;

pub use row::{align, Alignment, FeatureRow};
pub use schema::{ColumnRole, FeatureSchema, RawColumn};
pub use value::{FeatureMap, FeatureValue};
