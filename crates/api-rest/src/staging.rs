//! Transient staging area for uploaded bytes.
//!
//! Uploads land here before a sync and are discarded once the sync settles,
//! whichever way it went. Nothing in this store is long-lived; the directory
//! only has to outlive the request that wrote to it.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

/// A staged upload on disk.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Write-and-discard store rooted at one directory.
#[derive(Debug)]
pub struct StagingStore {
    root: PathBuf,
}

impl StagingStore {
    /// Open the store, creating the root directory if needed. The root is
    /// canonicalised so containment checks survive symlinked temp dirs.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stage one upload under `<root>/<dir_name>/`, named by a timestamp
    /// plus a UUID so concurrent uploads of the same file never collide.
    /// The original extension is kept so the blob stays recognisable.
    pub fn stage(
        &self,
        dir_name: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> io::Result<StagedFile> {
        let dir = if dir_name.is_empty() {
            self.root.clone()
        } else {
            self.root.join(dir_name)
        };
        std::fs::create_dir_all(&dir)?;

        let stored_name = format!(
            "{}-{}{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            extension_suffix(original_name)
        );
        let path = dir.join(stored_name);
        std::fs::write(&path, bytes)?;
        Ok(StagedFile {
            path,
            size: bytes.len() as u64,
        })
    }

    /// Remove a staged blob. A blob that is already gone is fine; other
    /// failures are logged rather than surfaced, so cleanup never masks
    /// the sync result.
    pub fn discard(&self, path: &Path) {
        if let Err(err) = std::fs::remove_file(path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::warn!("failed to discard staged file {}: {}", path.display(), err);
            }
        }
    }

    /// Whether `path` resolves to a file inside the staging root. Paths
    /// that do not exist, or escape the root via `..` or symlinks, do not.
    pub fn contains(&self, path: &Path) -> bool {
        match path.canonicalize() {
            Ok(resolved) => resolved.starts_with(&self.root),
            Err(_) => false,
        }
    }
}

fn extension_suffix(name: &str) -> String {
    match Path::new(name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!(".{ext}"),
        None => String::new(),
    }
}
