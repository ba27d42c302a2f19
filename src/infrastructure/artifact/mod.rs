//! Artifact persistence - pipeline document and schema helper files

mod schema_files;
mod store;

pub use schema_files::{SchemaFiles, COLUMNS_FILE, PREPROCESSED_SAMPLE_FILE};
pub use store::{write_atomic, FileArtifactStore};
