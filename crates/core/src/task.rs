//! Batch task types shared by the sync orchestrator and its callers.

use crate::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a task does to its file. Informational: both actions synchronise the
/// staged blob the same way, the distinction is recorded in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Upload,
    Modify,
}

impl std::fmt::Display for SyncAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncAction::Upload => write!(f, "upload"),
            SyncAction::Modify => write!(f, "modify"),
        }
    }
}

/// One file to synchronise into the remote repository.
///
/// The staged blob at `staging_path` is read-only to the engine; `size` is
/// the blob's byte length as known when the task was built and is checked
/// against the blob again before any remote work.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub staging_path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub dir_name: String,
    pub action: SyncAction,
}

impl FileTask {
    /// Build a task, validating the repository-facing names.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidInput`] when `file_name` is not a bare
    /// file name or `dir_name` is not a clean relative path.
    pub fn new(
        staging_path: PathBuf,
        file_name: impl Into<String>,
        size: u64,
        dir_name: impl Into<String>,
        action: SyncAction,
    ) -> SyncResult<Self> {
        let file_name = file_name.into();
        let dir_name = dir_name.into();
        validate_file_name(&file_name)?;
        validate_dir_name(&dir_name)?;

        Ok(Self {
            staging_path,
            file_name,
            size,
            dir_name,
            action,
        })
    }

    /// Repository path of this task's file, relative to the repository root.
    pub fn repo_path(&self) -> String {
        repo_relative_path(&self.dir_name, &self.file_name)
    }
}

/// Join a directory and file name into a repository-relative path.
pub fn repo_relative_path(dir_name: &str, file_name: &str) -> String {
    if dir_name.is_empty() {
        file_name.to_string()
    } else {
        format!("{dir_name}/{file_name}")
    }
}

/// Validate a bare file name: a single path segment, nothing that could
/// escape the target directory or smuggle in repository internals.
pub fn validate_file_name(name: &str) -> SyncResult<()> {
    if name.trim().is_empty() {
        return Err(SyncError::InvalidInput("file name cannot be empty".into()));
    }
    if name.contains(['/', '\\', '\0']) {
        return Err(SyncError::InvalidInput(format!(
            "file name cannot contain separators: {name}"
        )));
    }
    if name == "." || name == ".." {
        return Err(SyncError::InvalidInput(format!(
            "file name cannot be a directory reference: {name}"
        )));
    }
    Ok(())
}

/// Validate a repository-relative path: forward-slash separated segments,
/// each a valid bare name. Used for paths arriving from the HTTP boundary
/// (retrieve, delete, single-file sync) where subdirectories are allowed.
pub fn validate_repo_path(path: &str) -> SyncResult<()> {
    if path.trim().is_empty() {
        return Err(SyncError::InvalidInput("path cannot be empty".into()));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(SyncError::InvalidInput(format!(
                "path cannot contain empty segments: {path}"
            )));
        }
        validate_file_name(segment)?;
    }
    Ok(())
}

/// Validate a target directory: empty means the repository root, anything
/// else must be a clean relative path.
pub fn validate_dir_name(dir_name: &str) -> SyncResult<()> {
    if dir_name.is_empty() {
        return Ok(());
    }
    validate_repo_path(dir_name)
}
