//! The sync orchestrator.
//!
//! `SyncService` takes a validated batch of staged files, derives the batch
//! manifest, and routes everything either through the Contents API (small
//! files) or through an ephemeral sparse clone with LFS tracking (any file
//! over the large-file threshold). Collaborators arrive by injection, so a
//! service instance is plain data: no globals, nothing shared between calls
//! beyond what the remote itself enforces.

use crate::config::CoreConfig;
use crate::github::{upsert_with_retry, RemoteEntry, RemoteRepository};
use crate::manifest::{Manifest, MANIFEST_FILE_NAME};
use crate::retry::RetryPolicy;
use crate::scratch::{CloneManager, GitRunner, ScratchClone};
use crate::task::{validate_dir_name, validate_file_name, validate_repo_path, FileTask, SyncAction};
use crate::{SyncError, SyncResult};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Any file strictly larger than this routes its whole batch through the
/// clone/LFS path.
pub const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Push attempts per batch: the initial push plus one rebase-and-retry.
pub const PUSH_MAX_ATTEMPTS: u32 = 2;

/// Which route a sync took to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStrategy {
    ContentsApi,
    GitLfs,
}

impl std::fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStrategy::ContentsApi => write!(f, "contents api"),
            SyncStrategy::GitLfs => write!(f, "git clone with lfs"),
        }
    }
}

/// One row of what a sync call achieved. The clone path yields a single
/// batch-level outcome (`file: None`); the API path yields one per file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub strategy: SyncStrategy,
    pub meta: String,
}

/// Orchestrates file synchronisation into the remote repository.
pub struct SyncService {
    config: CoreConfig,
    remote: Arc<dyn RemoteRepository>,
    git: Arc<dyn GitRunner>,
    clones: CloneManager,
}

impl SyncService {
    pub fn new(
        config: CoreConfig,
        remote: Arc<dyn RemoteRepository>,
        git: Arc<dyn GitRunner>,
    ) -> Self {
        let clones = CloneManager::new(&config, git.clone());
        Self {
            config,
            remote,
            git,
            clones,
        }
    }

    /// Synchronise a batch of staged files plus the derived manifest.
    ///
    /// The whole batch must target one directory. A batch containing any
    /// file over [`LARGE_FILE_THRESHOLD`] goes through the clone/LFS path
    /// in one commit; otherwise every file is sent through the Contents API
    /// sequentially, manifest last, aborting on the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidInput`] for an empty batch, mixed target
    /// directories, or a staged blob whose length no longer matches its
    /// task; otherwise whatever the failing remote or git step raised.
    pub fn sync_batch(
        &self,
        tasks: Vec<FileTask>,
        commit_message: &str,
    ) -> SyncResult<Vec<SyncOutcome>> {
        let dir = validate_batch(&tasks)?;
        let has_large = tasks.iter().any(|task| task.size > LARGE_FILE_THRESHOLD);
        let strategy = if has_large {
            SyncStrategy::GitLfs
        } else {
            SyncStrategy::ContentsApi
        };
        tracing::info!(
            "syncing {} file(s) into '{}' via {}",
            tasks.len(),
            dir,
            strategy
        );

        let manifest = Manifest::build(&tasks, commit_message, Utc::now());
        let bytes = manifest.to_pretty_json()?;
        let blob = self.write_manifest_blob(&bytes)?;

        let mut tasks = tasks;
        tasks.push(FileTask::new(
            blob.path.clone(),
            MANIFEST_FILE_NAME,
            bytes.len() as u64,
            dir.clone(),
            SyncAction::Upload,
        )?);

        let outcomes = if has_large {
            self.sync_via_clone(&tasks, commit_message, &dir)?
        } else {
            self.sync_via_api(&tasks, commit_message, &dir)?
        };
        tracing::info!("synced {} artefact(s) into '{}'", tasks.len(), dir);
        Ok(outcomes)
    }

    /// Single-file create-or-update straight through the Contents API, for
    /// already-staged content. No manifest is derived.
    pub fn sync_file(
        &self,
        staging_path: &Path,
        repo_path: &str,
        commit_message: &str,
    ) -> SyncResult<()> {
        validate_repo_path(repo_path)?;
        upsert_with_retry(self.remote.as_ref(), repo_path, staging_path, commit_message)
    }

    /// Read the raw bytes of a remote file.
    pub fn read_file(&self, repo_path: &str) -> SyncResult<Vec<u8>> {
        validate_repo_path(repo_path)?;
        self.remote.fetch(repo_path)
    }

    /// Delete a remote file, keyed on its current version token. A writer
    /// racing between the probe and the delete surfaces as
    /// [`SyncError::Conflict`]; deletion is deliberately not retried.
    pub fn delete_file(&self, repo_path: &str, commit_message: &str) -> SyncResult<()> {
        validate_repo_path(repo_path)?;
        let handle = self
            .remote
            .probe(repo_path)?
            .ok_or_else(|| SyncError::NotFound(repo_path.to_string()))?;
        self.remote.remove(repo_path, &handle.token, commit_message)
    }

    /// List the remote entries under `dir` (empty for the repository root).
    pub fn list_files(&self, dir: &str) -> SyncResult<Vec<RemoteEntry>> {
        validate_dir_name(dir)?;
        self.remote.list(dir)
    }

    fn sync_via_api(
        &self,
        tasks: &[FileTask],
        commit_message: &str,
        dir: &str,
    ) -> SyncResult<Vec<SyncOutcome>> {
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            upsert_with_retry(
                self.remote.as_ref(),
                &task.repo_path(),
                &task.staging_path,
                commit_message,
            )?;
            outcomes.push(SyncOutcome {
                dir: dir.to_string(),
                file: Some(task.file_name.clone()),
                strategy: SyncStrategy::ContentsApi,
                meta: MANIFEST_FILE_NAME.to_string(),
            });
        }
        Ok(outcomes)
    }

    fn sync_via_clone(
        &self,
        tasks: &[FileTask],
        commit_message: &str,
        dir: &str,
    ) -> SyncResult<Vec<SyncOutcome>> {
        let mut clone = self.clones.acquire(dir)?;
        let result = self.fill_commit_push(&clone, tasks, commit_message);
        self.clones.release(&mut clone);
        result?;

        Ok(vec![SyncOutcome {
            dir: dir.to_string(),
            file: None,
            strategy: SyncStrategy::GitLfs,
            meta: MANIFEST_FILE_NAME.to_string(),
        }])
    }

    fn fill_commit_push(
        &self,
        clone: &ScratchClone,
        tasks: &[FileTask],
        commit_message: &str,
    ) -> SyncResult<()> {
        for task in tasks {
            let target = clone.workdir().join(task.repo_path());
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(|source| SyncError::FileWrite {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::copy(&task.staging_path, &target).map_err(|source| {
                SyncError::FileWrite {
                    path: target.clone(),
                    source,
                }
            })?;
            // Tracking must be registered before the file is staged so the
            // .gitattributes change rides in the same commit.
            if task.size > LARGE_FILE_THRESHOLD {
                self.git.lfs_track(clone.workdir(), &task.repo_path())?;
            }
        }

        let mut staged = vec![".gitattributes".to_string()];
        staged.extend(tasks.iter().map(FileTask::repo_path));
        self.git.stage(clone.workdir(), &staged)?;
        self.git.commit(clone.workdir(), commit_message)?;
        self.push_with_rebase(clone)
    }

    fn push_with_rebase(&self, clone: &ScratchClone) -> SyncResult<()> {
        let branch = self.config.default_branch();
        let result = RetryPolicy::new(PUSH_MAX_ATTEMPTS).run(
            || self.git.push(clone.workdir(), branch),
            |err| matches!(err, SyncError::GitPush(_)),
            |err, attempt| {
                tracing::warn!(
                    "push to {} rejected (attempt {} of {}): {}; rebasing onto upstream",
                    branch,
                    attempt,
                    PUSH_MAX_ATTEMPTS,
                    err
                );
                self.git.pull_rebase(clone.workdir(), branch)
            },
        );
        match result {
            Err(SyncError::GitPush(command_error)) => {
                Err(SyncError::PushRetryExhausted(command_error))
            }
            other => other,
        }
    }

    fn write_manifest_blob(&self, bytes: &[u8]) -> SyncResult<ManifestBlob> {
        let dir = self.config.scratch_dir();
        std::fs::create_dir_all(dir).map_err(|source| SyncError::ScratchDirCreation {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(format!("gitdrop-manifest-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, bytes).map_err(|source| SyncError::FileWrite {
            path: path.clone(),
            source,
        })?;
        Ok(ManifestBlob { path })
    }
}

/// Staging blob the manifest is synced from; removed when the call finishes.
struct ManifestBlob {
    path: PathBuf,
}

impl Drop for ManifestBlob {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "failed to remove manifest blob {}: {}",
                    self.path.display(),
                    err
                );
            }
        }
    }
}

/// Check the batch invariants and return the shared target directory.
fn validate_batch(tasks: &[FileTask]) -> SyncResult<String> {
    let first = tasks
        .first()
        .ok_or_else(|| SyncError::InvalidInput("batch cannot be empty".into()))?;
    let dir = first.dir_name.clone();
    validate_dir_name(&dir)?;

    for task in tasks {
        validate_file_name(&task.file_name)?;
        if task.dir_name != dir {
            return Err(SyncError::InvalidInput(format!(
                "batch tasks must target one directory, found '{}' and '{}'",
                dir, task.dir_name
            )));
        }
        let metadata =
            std::fs::metadata(&task.staging_path).map_err(|source| SyncError::FileRead {
                path: task.staging_path.clone(),
                source,
            })?;
        if metadata.len() != task.size {
            return Err(SyncError::InvalidInput(format!(
                "staged blob size mismatch for {}: recorded {}, found {}",
                task.file_name,
                task.size,
                metadata.len()
            )));
        }
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGit, FakeRemote, GitCall};
    use tempfile::TempDir;

    struct Harness {
        service: SyncService,
        remote: Arc<FakeRemote>,
        git: Arc<FakeGit>,
        staging: TempDir,
        scratch: TempDir,
    }

    fn harness() -> Harness {
        let staging = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let config = CoreConfig::new(
            "secret".to_string(),
            "octo".to_string(),
            "files".to_string(),
            scratch.path().to_path_buf(),
        )
        .unwrap();
        let remote = Arc::new(FakeRemote::new());
        let git = Arc::new(FakeGit::new());
        let service = SyncService::new(config, remote.clone(), git.clone());
        Harness {
            service,
            remote,
            git,
            staging,
            scratch,
        }
    }

    fn staged(h: &Harness, name: &str, dir: &str, content: &[u8], action: SyncAction) -> FileTask {
        let path = h.staging.path().join(name);
        std::fs::write(&path, content).unwrap();
        FileTask::new(path, name, content.len() as u64, dir, action).unwrap()
    }

    /// A sparse file of the given length, so large-file tests stay cheap.
    fn staged_sparse(h: &Harness, name: &str, dir: &str, size: u64) -> FileTask {
        let path = h.staging.path().join(name);
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(size).unwrap();
        FileTask::new(path, name, size, dir, SyncAction::Upload).unwrap()
    }

    fn scratch_is_empty(h: &Harness) -> bool {
        std::fs::read_dir(h.scratch.path()).unwrap().next().is_none()
    }

    #[test]
    fn small_batch_goes_through_the_api_in_order() {
        let h = harness();
        let tasks = vec![
            staged(&h, "a.txt", "docs", b"aaaaaaaaaa", SyncAction::Upload),
            staged(&h, "b.png", "docs", b"bbbbbbbbbbbbbbbbbbbb", SyncAction::Upload),
        ];

        let outcomes = h.service.sync_batch(tasks, "Batch upload by alice").unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(
            h.remote.upserted_paths(),
            vec!["docs/a.txt", "docs/b.png", "docs/meta.json"]
        );
        assert!(h.git.calls().is_empty());
        assert!(scratch_is_empty(&h));
    }

    #[test]
    fn api_outcomes_carry_file_names_and_strategy() {
        let h = harness();
        let tasks = vec![staged(&h, "a.txt", "docs", b"aa", SyncAction::Modify)];

        let outcomes = h.service.sync_batch(tasks, "Modify by alice").unwrap();

        assert_eq!(outcomes[0].file.as_deref(), Some("a.txt"));
        assert_eq!(outcomes[0].strategy, SyncStrategy::ContentsApi);
        assert_eq!(outcomes[0].dir, "docs");
        assert_eq!(outcomes[0].meta, MANIFEST_FILE_NAME);
        assert_eq!(outcomes[1].file.as_deref(), Some(MANIFEST_FILE_NAME));
    }

    #[test]
    fn manifest_describes_the_batch_but_not_itself() {
        let h = harness();
        let tasks = vec![
            staged(&h, "a.txt", "docs", b"aaaaa", SyncAction::Upload),
            staged(&h, "b.txt", "docs", b"bb", SyncAction::Modify),
        ];

        h.service.sync_batch(tasks, "Batch upload by alice").unwrap();

        let bytes = h.remote.stored("docs/meta.json").unwrap();
        let manifest: Manifest = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(manifest.files[0].file_name, "a.txt");
        assert_eq!(manifest.files[0].size, 5);
        assert_eq!(manifest.files[1].action, SyncAction::Modify);
        assert_eq!(manifest.commit_message, "Batch upload by alice");
    }

    #[test]
    fn api_path_aborts_on_the_first_failure() {
        let h = harness();
        let tasks = vec![
            staged(&h, "a.txt", "docs", b"aa", SyncAction::Upload),
            staged(&h, "b.txt", "docs", b"bb", SyncAction::Upload),
        ];
        h.remote.fail_upserts_with_status(500, 1);

        let err = h.service.sync_batch(tasks, "msg").unwrap_err();

        assert!(matches!(err, SyncError::ApiStatus { code: 500, .. }));
        assert_eq!(h.remote.upserted_paths(), vec!["docs/a.txt"]);
        assert!(scratch_is_empty(&h));
    }

    #[test]
    fn one_large_file_routes_the_whole_batch_through_the_clone() {
        let h = harness();
        let tasks = vec![
            staged(&h, "a.txt", "docs", &[b'a'; 10], SyncAction::Upload),
            staged(&h, "b.txt", "docs", &[b'b'; 20], SyncAction::Upload),
            staged(&h, "c.txt", "docs", &[b'c'; 30], SyncAction::Upload),
            staged_sparse(&h, "big.bin", "docs", 200 * 1024 * 1024),
        ];

        let outcomes = h.service.sync_batch(tasks, "Batch upload by alice").unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].file, None);
        assert_eq!(outcomes[0].strategy, SyncStrategy::GitLfs);
        assert!(h.remote.calls().is_empty());
        assert!(scratch_is_empty(&h));
    }

    #[test]
    fn clone_path_tracks_large_files_before_staging() {
        let h = harness();
        let tasks = vec![
            staged(&h, "small.txt", "docs", b"sss", SyncAction::Upload),
            staged_sparse(&h, "big.bin", "docs", LARGE_FILE_THRESHOLD + 1),
        ];

        h.service.sync_batch(tasks, "Upload by alice").unwrap();

        assert_eq!(h.git.tracked_patterns(), vec!["docs/big.bin"]);
        let calls = h.git.calls();
        let track_at = calls
            .iter()
            .position(|call| matches!(call, GitCall::LfsTrack { .. }))
            .unwrap();
        let stage_at = calls
            .iter()
            .position(|call| matches!(call, GitCall::Stage { .. }))
            .unwrap();
        assert!(track_at < stage_at);

        let staged_paths = calls
            .iter()
            .find_map(|call| match call {
                GitCall::Stage { paths } => Some(paths.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(staged_paths[0], ".gitattributes");
        assert!(staged_paths.contains(&"docs/small.txt".to_string()));
        assert!(staged_paths.contains(&"docs/big.bin".to_string()));
        assert!(staged_paths.contains(&"docs/meta.json".to_string()));
    }

    #[test]
    fn clone_path_commits_once_and_pushes_the_configured_branch() {
        let h = harness();
        let tasks = vec![staged_sparse(&h, "big.bin", "media", LARGE_FILE_THRESHOLD + 1)];

        h.service.sync_batch(tasks, "Upload by alice").unwrap();

        let calls = h.git.calls();
        assert!(matches!(&calls[0], GitCall::CloneSparse { .. }));
        assert!(matches!(&calls[1], GitCall::SparseScope { dir } if dir == "media"));
        let commits: Vec<_> = calls
            .iter()
            .filter(|call| matches!(call, GitCall::Commit { .. }))
            .collect();
        assert_eq!(commits.len(), 1);
        assert!(matches!(calls.last().unwrap(), GitCall::Push { branch } if branch == "main"));
        // Copied blobs and the manifest really were on disk at stage time.
        let on_disk = h.git.staged_on_disk();
        assert!(on_disk.contains(&"media/big.bin".to_string()));
        assert!(on_disk.contains(&"media/meta.json".to_string()));
    }

    #[test]
    fn rejected_push_rebases_then_succeeds() {
        let h = harness();
        h.git.fail_pushes(1);
        let tasks = vec![staged_sparse(&h, "big.bin", "docs", LARGE_FILE_THRESHOLD + 1)];

        let outcomes = h.service.sync_batch(tasks, "Upload by alice").unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(h.git.push_attempts(), 2);
        assert_eq!(h.git.rebase_count(), 1);
        let calls = h.git.calls();
        let tail: Vec<_> = calls.iter().rev().take(3).collect();
        assert!(matches!(tail[0], GitCall::Push { .. }));
        assert!(matches!(tail[1], GitCall::PullRebase { .. }));
        assert!(matches!(tail[2], GitCall::Push { .. }));
    }

    #[test]
    fn push_rejected_twice_fails_without_a_third_attempt() {
        let h = harness();
        h.git.fail_pushes(2);
        let tasks = vec![staged_sparse(&h, "big.bin", "docs", LARGE_FILE_THRESHOLD + 1)];

        let err = h.service.sync_batch(tasks, "Upload by alice").unwrap_err();

        assert!(matches!(err, SyncError::PushRetryExhausted(_)));
        assert_eq!(h.git.push_attempts(), 2);
        assert_eq!(h.git.rebase_count(), 1);
        assert!(scratch_is_empty(&h));
    }

    #[test]
    fn rebase_failure_surfaces_as_itself() {
        let h = harness();
        h.git.fail_pushes(1);
        h.git.fail_rebases(1);
        let tasks = vec![staged_sparse(&h, "big.bin", "docs", LARGE_FILE_THRESHOLD + 1)];

        let err = h.service.sync_batch(tasks, "Upload by alice").unwrap_err();

        assert!(matches!(err, SyncError::GitRebase(_)));
        assert_eq!(h.git.push_attempts(), 1);
        assert!(scratch_is_empty(&h));
    }

    #[test]
    fn commit_failure_still_cleans_up_the_clone() {
        let h = harness();
        h.git.fail_commits(1);
        let tasks = vec![staged_sparse(&h, "big.bin", "docs", LARGE_FILE_THRESHOLD + 1)];

        let err = h.service.sync_batch(tasks, "Upload by alice").unwrap_err();

        assert!(matches!(err, SyncError::GitCommit(_)));
        assert_eq!(h.git.push_attempts(), 0);
        assert!(scratch_is_empty(&h));
    }

    #[test]
    fn empty_batch_is_rejected_before_any_remote_work() {
        let h = harness();

        let err = h.service.sync_batch(Vec::new(), "msg").unwrap_err();

        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert!(h.remote.calls().is_empty());
        assert!(h.git.calls().is_empty());
    }

    #[test]
    fn mixed_directory_batch_is_rejected() {
        let h = harness();
        let tasks = vec![
            staged(&h, "a.txt", "docs", b"aa", SyncAction::Upload),
            staged(&h, "b.txt", "media", b"bb", SyncAction::Upload),
        ];

        let err = h.service.sync_batch(tasks, "msg").unwrap_err();

        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert!(h.remote.calls().is_empty());
    }

    #[test]
    fn stale_task_size_is_rejected() {
        let h = harness();
        let mut task = staged(&h, "a.txt", "docs", b"aa", SyncAction::Upload);
        task.size = 99;

        let err = h.service.sync_batch(vec![task], "msg").unwrap_err();

        match err {
            SyncError::InvalidInput(message) => assert!(message.contains("a.txt")),
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn missing_staged_blob_is_rejected_before_any_remote_work() {
        let h = harness();
        let task = FileTask::new(
            h.staging.path().join("vanished.txt"),
            "vanished.txt",
            3,
            "docs",
            SyncAction::Upload,
        )
        .unwrap();

        let err = h.service.sync_batch(vec![task], "msg").unwrap_err();

        assert!(matches!(err, SyncError::FileRead { .. }));
        assert!(h.remote.calls().is_empty());
    }

    #[test]
    fn sync_file_upserts_at_the_given_path() {
        let h = harness();
        let blob = h.staging.path().join("note.txt");
        std::fs::write(&blob, b"hello").unwrap();

        h.service.sync_file(&blob, "docs/note.txt", "Sync file").unwrap();

        assert_eq!(h.remote.stored("docs/note.txt").unwrap(), b"hello");
    }

    #[test]
    fn sync_file_rejects_traversal_paths() {
        let h = harness();
        let blob = h.staging.path().join("note.txt");
        std::fs::write(&blob, b"hello").unwrap();

        let err = h
            .service
            .sync_file(&blob, "../note.txt", "Sync file")
            .unwrap_err();

        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert!(h.remote.calls().is_empty());
    }

    #[test]
    fn delete_probes_for_the_token_then_removes() {
        let h = harness();
        h.remote.seed("docs/a.txt", b"aa");

        h.service.delete_file("docs/a.txt", "Delete file").unwrap();

        assert_eq!(h.remote.stored("docs/a.txt"), None);
    }

    #[test]
    fn delete_of_a_missing_file_is_not_found() {
        let h = harness();

        let err = h.service.delete_file("docs/a.txt", "Delete file").unwrap_err();

        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[test]
    fn read_file_returns_remote_bytes() {
        let h = harness();
        h.remote.seed("docs/a.txt", b"content");

        assert_eq!(h.service.read_file("docs/a.txt").unwrap(), b"content");
    }

    #[test]
    fn list_files_delegates_to_the_remote() {
        let h = harness();
        h.remote.seed("docs/a.txt", b"aa");
        h.remote.seed("docs/b.txt", b"bb");
        h.remote.seed("media/c.bin", b"cc");

        let entries = h.service.list_files("docs").unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "docs/a.txt");
        assert_eq!(entries[1].name, "b.txt");
    }
}
