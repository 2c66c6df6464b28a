//! In-memory test doubles for the remote repository and the git runner.

use crate::github::{RemoteEntry, RemoteFileHandle, RemoteRepository};
use crate::scratch::{CommandError, GitRunner};
use crate::{SyncError, SyncResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Probe(String),
    Fetch(String),
    Upsert {
        path: String,
        token: Option<String>,
        message: String,
    },
    Remove {
        path: String,
        token: String,
        message: String,
    },
    List(String),
}

#[derive(Default)]
struct RemoteState {
    files: HashMap<String, (Vec<u8>, String)>,
    calls: Vec<RemoteCall>,
    token_counter: u64,
    conflict_failures: u32,
    status_failures: Vec<u16>,
}

/// In-memory [`RemoteRepository`] with call recording and failure injection.
/// Version tokens advance on every successful write, so stale-token conflicts
/// behave like the real API's.
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<RemoteState>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, path: &str, content: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.token_counter += 1;
        let token = format!("v{}", state.token_counter);
        state.files.insert(path.to_string(), (content.to_vec(), token));
    }

    pub fn stored(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.files.get(path).map(|(content, _)| content.clone())
    }

    pub fn current_token(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.files.get(path).map(|(_, token)| token.clone())
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn upsert_attempts(&self) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| matches!(call, RemoteCall::Upsert { .. }))
            .count() as u32
    }

    pub fn upserted_paths(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter_map(|call| match call {
                RemoteCall::Upsert { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Make the next `count` upserts fail with a version conflict.
    pub fn fail_upserts_with_conflict(&self, count: u32) {
        self.state.lock().unwrap().conflict_failures = count;
    }

    /// Make the next upserts fail with the given API statuses, in order.
    pub fn fail_upserts_with_status(&self, code: u16, count: u32) {
        let mut state = self.state.lock().unwrap();
        state.status_failures = vec![code; count as usize];
    }
}

impl RemoteRepository for FakeRemote {
    fn probe(&self, path: &str) -> SyncResult<Option<RemoteFileHandle>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::Probe(path.to_string()));
        Ok(state.files.get(path).map(|(_, token)| RemoteFileHandle {
            path: path.to_string(),
            token: token.clone(),
        }))
    }

    fn fetch(&self, path: &str) -> SyncResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::Fetch(path.to_string()));
        state
            .files
            .get(path)
            .map(|(content, _)| content.clone())
            .ok_or_else(|| SyncError::NotFound(path.to_string()))
    }

    fn upsert(
        &self,
        path: &str,
        content: &[u8],
        token: Option<&str>,
        message: &str,
    ) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::Upsert {
            path: path.to_string(),
            token: token.map(str::to_string),
            message: message.to_string(),
        });

        if state.conflict_failures > 0 {
            state.conflict_failures -= 1;
            return Err(SyncError::Conflict(path.to_string()));
        }
        if let Some(code) = state.status_failures.pop() {
            return Err(SyncError::ApiStatus {
                code,
                path: path.to_string(),
                message: "injected failure".to_string(),
            });
        }
        if let Some((_, current)) = state.files.get(path) {
            if token != Some(current.as_str()) {
                return Err(SyncError::Conflict(path.to_string()));
            }
        }

        state.token_counter += 1;
        let next = format!("v{}", state.token_counter);
        state.files.insert(path.to_string(), (content.to_vec(), next));
        Ok(())
    }

    fn remove(&self, path: &str, token: &str, message: &str) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::Remove {
            path: path.to_string(),
            token: token.to_string(),
            message: message.to_string(),
        });

        match state.files.get(path) {
            None => Err(SyncError::NotFound(path.to_string())),
            Some((_, current)) if current != token => Err(SyncError::Conflict(path.to_string())),
            Some(_) => {
                state.files.remove(path);
                Ok(())
            }
        }
    }

    fn list(&self, dir: &str) -> SyncResult<Vec<RemoteEntry>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RemoteCall::List(dir.to_string()));

        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        let mut entries: Vec<RemoteEntry> = state
            .files
            .iter()
            .filter(|(path, _)| path.starts_with(&prefix))
            .map(|(path, (content, token))| RemoteEntry {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.clone(),
                sha: token.clone(),
                size: content.len() as u64,
                kind: "file".to_string(),
            })
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    CloneSparse { url: String, dest: PathBuf },
    SparseScope { dir: String },
    LfsTrack { pattern: String },
    Stage { paths: Vec<String> },
    Commit { message: String },
    Push { branch: String },
    PullRebase { branch: String },
}

#[derive(Default)]
struct GitState {
    calls: Vec<GitCall>,
    staged_on_disk: Vec<String>,
    clone_failures: u32,
    commit_failures: u32,
    push_failures: u32,
    rebase_failures: u32,
}

/// Recording [`GitRunner`] that touches no real repository.
#[derive(Default)]
pub struct FakeGit {
    state: Mutex<GitState>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn push_attempts(&self) -> u32 {
        self.count(|call| matches!(call, GitCall::Push { .. }))
    }

    pub fn rebase_count(&self) -> u32 {
        self.count(|call| matches!(call, GitCall::PullRebase { .. }))
    }

    /// Staged paths that really existed under the workdir when `stage` ran,
    /// so tests can check the copy step without keeping the clone around.
    pub fn staged_on_disk(&self) -> Vec<String> {
        self.state.lock().unwrap().staged_on_disk.clone()
    }

    pub fn tracked_patterns(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter_map(|call| match call {
                GitCall::LfsTrack { pattern } => Some(pattern.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fail_clones(&self, count: u32) {
        self.state.lock().unwrap().clone_failures = count;
    }

    pub fn fail_commits(&self, count: u32) {
        self.state.lock().unwrap().commit_failures = count;
    }

    pub fn fail_pushes(&self, count: u32) {
        self.state.lock().unwrap().push_failures = count;
    }

    pub fn fail_rebases(&self, count: u32) {
        self.state.lock().unwrap().rebase_failures = count;
    }

    fn count(&self, matcher: impl Fn(&GitCall) -> bool) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| matcher(call))
            .count() as u32
    }

    fn injected(step: &'static str) -> CommandError {
        CommandError {
            step,
            status: Some(1),
            stderr: "injected failure".to_string(),
        }
    }
}

impl GitRunner for FakeGit {
    fn clone_sparse(&self, remote_url: &str, dest: &Path) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GitCall::CloneSparse {
            url: remote_url.to_string(),
            dest: dest.to_path_buf(),
        });
        if state.clone_failures > 0 {
            state.clone_failures -= 1;
            return Err(SyncError::GitClone(Self::injected("clone")));
        }
        Ok(())
    }

    fn sparse_scope(&self, _workdir: &Path, dir: &str) -> SyncResult<()> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(GitCall::SparseScope {
                dir: dir.to_string(),
            });
        Ok(())
    }

    fn lfs_track(&self, _workdir: &Path, pattern: &str) -> SyncResult<()> {
        self.state.lock().unwrap().calls.push(GitCall::LfsTrack {
            pattern: pattern.to_string(),
        });
        Ok(())
    }

    fn stage(&self, workdir: &Path, paths: &[String]) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GitCall::Stage {
            paths: paths.to_vec(),
        });
        state.staged_on_disk = paths
            .iter()
            .filter(|path| workdir.join(path).is_file())
            .cloned()
            .collect();
        Ok(())
    }

    fn commit(&self, _workdir: &Path, message: &str) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GitCall::Commit {
            message: message.to_string(),
        });
        if state.commit_failures > 0 {
            state.commit_failures -= 1;
            return Err(SyncError::GitCommit(Self::injected("commit")));
        }
        Ok(())
    }

    fn push(&self, _workdir: &Path, branch: &str) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GitCall::Push {
            branch: branch.to_string(),
        });
        if state.push_failures > 0 {
            state.push_failures -= 1;
            return Err(SyncError::GitPush(Self::injected("push")));
        }
        Ok(())
    }

    fn pull_rebase(&self, _workdir: &Path, branch: &str) -> SyncResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GitCall::PullRebase {
            branch: branch.to_string(),
        });
        if state.rebase_failures > 0 {
            state.rebase_failures -= 1;
            return Err(SyncError::GitRebase(Self::injected("pull --rebase")));
        }
        Ok(())
    }
}
