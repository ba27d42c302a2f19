//! Domain layer - Core business logic and entities

pub mod dataset;
pub mod error;
pub mod feature;
pub mod pipeline;
pub mod preprocessing;
pub mod regressor;
pub mod training;

pub use dataset::Dataset;
pub use error::DomainError;
pub use feature::{
    align, Alignment, ColumnRole, FeatureMap, FeatureRow, FeatureSchema, FeatureValue, RawColumn,
};
pub use pipeline::{PipelineArtifact, PricePipeline, ARTIFACT_FORMAT_VERSION};
pub use preprocessing::{ColumnTransformer, PreprocessorSpec};
pub use regressor::{GradientBoostingConfig, GradientBoostingRegressor};
pub use training::{ExportBundle, FitOptions, FittedPipeline, PipelineSpec};
