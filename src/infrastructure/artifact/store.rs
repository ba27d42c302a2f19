//! File-backed pipeline artifact store

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{DomainError, PipelineArtifact};

/// Reads and writes the pipeline artifact as a JSON document
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    path: PathBuf,
}

impl FileArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the artifact.
    ///
    /// Every failure is a configuration error naming the path and the
    /// underlying cause.
    pub fn load(&self) -> Result<PipelineArtifact, DomainError> {
        let bytes = fs::read(&self.path).map_err(|e| self.load_error(e))?;

        let artifact: PipelineArtifact =
            serde_json::from_slice(&bytes).map_err(|e| self.load_error(e))?;
        artifact.validate().map_err(|e| self.load_error(e))?;

        info!(
            path = %self.path.display(),
            format_version = artifact.format_version,
            created_at = %artifact.created_at,
            target = %artifact.target_column,
            validation_rmse = artifact.validation_rmse,
            "Loaded pipeline artifact"
        );

        Ok(artifact)
    }

    pub fn save(&self, artifact: &PipelineArtifact) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec(artifact).map_err(|e| {
            DomainError::storage(format!("Failed to serialize pipeline artifact: {}", e))
        })?;

        write_atomic(&self.path, &bytes)?;
        info!(path = %self.path.display(), "Saved pipeline artifact");

        Ok(())
    }

    fn load_error(&self, cause: impl std::fmt::Display) -> DomainError {
        DomainError::configuration(format!(
            "Failed to load model pipeline from {}: {}. \
             The artifact may be missing, corrupted, or written by an incompatible version; \
             re-run training to regenerate it",
            self.path.display(),
            cause
        ))
    }
}

/// Write `bytes` to a sibling temp file and rename it over `path`
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DomainError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            DomainError::storage(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| DomainError::storage(format!("Invalid output path {}", path.display())))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes).map_err(|e| {
        DomainError::storage(format!("Failed to write {}: {}", tmp_path.display(), e))
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DomainError::storage(format!("Failed to move output into {}: {}", path.display(), e))
    })
}
