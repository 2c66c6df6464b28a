//! # Gitdrop Core
//!
//! The sync engine behind the gitdrop file upload service.
//!
//! A batch of staged files is synchronised into a remote GitHub repository
//! one of two ways:
//! - Contents API path: every file, plus the derived `meta.json` manifest,
//!   is created or updated through the REST Contents API with a bounded
//!   conflict retry per file.
//! - Clone/LFS path: when any file exceeds [`sync::LARGE_FILE_THRESHOLD`],
//!   the whole batch is committed inside an ephemeral sparse clone, large
//!   files registered with git-lfs, and pushed with one rebase-and-retry.
//!
//! **No API concerns**: multipart parsing, upload validation and HTTP
//! routing belong in `api-rest`.
//!
//! ## Example
//!
//! ```no_run
//! use gitdrop_core::{CoreConfig, FileTask, GithubClient, SyncAction, SyncService, SystemGit};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoreConfig::new(
//!     "ghp_example".to_string(),
//!     "octo".to_string(),
//!     "files".to_string(),
//!     std::env::temp_dir(),
//! )?;
//! let remote = Arc::new(GithubClient::new(&config));
//! let git = Arc::new(SystemGit::new(&config));
//! let service = SyncService::new(config, remote, git);
//!
//! let task = FileTask::new(
//!     PathBuf::from("/var/staging/report.pdf"),
//!     "report.pdf",
//!     48_113,
//!     "docs",
//!     SyncAction::Upload,
//! )?;
//! let outcomes = service.sync_batch(vec![task], "Upload by alice")?;
//! println!("synced {} artefact(s)", outcomes.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod github;
pub mod manifest;
pub mod retry;
pub mod scratch;
pub mod sync;
pub mod task;

#[cfg(test)]
pub(crate) mod testing;

pub use config::CoreConfig;
pub use error::{SyncError, SyncResult};
pub use github::{GithubClient, RemoteEntry, RemoteFileHandle, RemoteRepository};
pub use manifest::{Manifest, ManifestEntry, MANIFEST_FILE_NAME};
pub use scratch::{CloneManager, GitRunner, ScratchClone, SystemGit};
pub use sync::{SyncOutcome, SyncService, SyncStrategy, LARGE_FILE_THRESHOLD};
pub use task::{FileTask, SyncAction};
