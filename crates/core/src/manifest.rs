//! Batch manifest, committed alongside every synchronised batch.

use crate::task::{FileTask, SyncAction};
use crate::{SyncError, SyncResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name the manifest takes inside the repository. The blob it is written
/// from gets a unique per-call name; only the committed name is fixed.
pub const MANIFEST_FILE_NAME: &str = "meta.json";

/// One row of the manifest, describing a file the batch synchronised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub file_name: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub action: SyncAction,
}

/// Record of what a single sync call shipped: one entry per task, the
/// commit message, and the batch timestamp. Derived from the batch on
/// every call and overwritten in the repository, never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub files: Vec<ManifestEntry>,
    pub commit_message: String,
    pub updated_at: DateTime<Utc>,
}

impl Manifest {
    /// Build the manifest for a batch. Pure: the same tasks, message and
    /// clock always produce the same manifest.
    pub fn build(tasks: &[FileTask], commit_message: &str, at: DateTime<Utc>) -> Self {
        let files = tasks
            .iter()
            .map(|task| ManifestEntry {
                file_name: task.file_name.clone(),
                size: task.size,
                uploaded_at: at,
                action: task.action,
            })
            .collect();

        Self {
            files,
            commit_message: commit_message.to_string(),
            updated_at: at,
        }
    }

    /// Serialise to the pretty JSON bytes that get committed. The recorded
    /// size of the manifest task must be the length of exactly these bytes.
    pub fn to_pretty_json(&self) -> SyncResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(SyncError::Serialization)
    }
}
