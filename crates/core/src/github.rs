//! Remote content access over the GitHub Contents API.
//!
//! The orchestrator only sees the [`RemoteRepository`] trait; [`GithubClient`]
//! is the production implementation. Version tokens are the blob SHAs the API
//! returns on reads and demands back on writes, which is what makes the
//! optimistic-concurrency retry in [`upsert_with_retry`] work.

use crate::config::CoreConfig;
use crate::retry::RetryPolicy;
use crate::{SyncError, SyncResult};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::json;
use std::io::Read;
use std::path::Path;

/// Total attempts for a conflicted create-or-update, the first try included.
pub const UPSERT_MAX_ATTEMPTS: u32 = 2;

const ACCEPT_HEADER: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "2022-11-28";
const USER_AGENT: &str = concat!("gitdrop/", env!("CARGO_PKG_VERSION"));

/// Proof of a remote read: the path plus the opaque version token to hand
/// back on the next write or delete of that path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileHandle {
    pub path: String,
    pub token: String,
}

/// One row of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The narrow seam between the sync engine and the remote repository.
pub trait RemoteRepository: Send + Sync {
    /// Read the current version token for `path`. Absence is `Ok(None)`,
    /// not an error: it is what selects create semantics on the next write.
    fn probe(&self, path: &str) -> SyncResult<Option<RemoteFileHandle>>;

    /// Read the raw bytes at `path`.
    fn fetch(&self, path: &str) -> SyncResult<Vec<u8>>;

    /// Create (`token: None`) or update (`token: Some`) the file at `path`.
    /// A stale token fails with [`SyncError::Conflict`].
    fn upsert(
        &self,
        path: &str,
        content: &[u8],
        token: Option<&str>,
        message: &str,
    ) -> SyncResult<()>;

    /// Delete the file at `path`, keyed on the version token from the last
    /// probe. A concurrent writer surfaces as [`SyncError::Conflict`].
    fn remove(&self, path: &str, token: &str, message: &str) -> SyncResult<()>;

    /// List the entries under `dir` (empty for the repository root).
    fn list(&self, dir: &str) -> SyncResult<Vec<RemoteEntry>>;
}

/// Create-or-update with bounded conflict retry.
///
/// Each attempt re-reads the current version token and writes with it, so a
/// not-yet-existing path becomes a create without a token. Only
/// [`SyncError::Conflict`] is retried; after [`UPSERT_MAX_ATTEMPTS`] total
/// attempts the conflict surfaces to the caller. The staged blob is re-read
/// per attempt, keeping the engine free of cached file state.
pub fn upsert_with_retry(
    remote: &dyn RemoteRepository,
    path: &str,
    blob_path: &Path,
    message: &str,
) -> SyncResult<()> {
    RetryPolicy::new(UPSERT_MAX_ATTEMPTS).run(
        || {
            let token = remote.probe(path)?.map(|handle| handle.token);
            let content = std::fs::read(blob_path).map_err(|source| SyncError::FileRead {
                path: blob_path.to_path_buf(),
                source,
            })?;
            remote.upsert(path, &content, token.as_deref(), message)
        },
        |err| matches!(err, SyncError::Conflict(_)),
        |_, attempt| {
            tracing::warn!(
                "version conflict on {}, retrying with a fresh token (attempt {} of {})",
                path,
                attempt,
                UPSERT_MAX_ATTEMPTS
            );
            Ok(())
        },
    )
}

/// Contents API client for one configured repository.
pub struct GithubClient {
    agent: ureq::Agent,
    api_base: String,
    repo_owner: String,
    repo_name: String,
    token: String,
    branch: String,
    author_name: String,
    author_email: String,
}

impl GithubClient {
    pub fn new(config: &CoreConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.http_timeout())
            .user_agent(USER_AGENT)
            .build();

        Self {
            agent,
            api_base: config.api_base().trim_end_matches('/').to_string(),
            repo_owner: config.repo_owner().to_string(),
            repo_name: config.repo_name().to_string(),
            token: config.token().to_string(),
            branch: config.default_branch().to_string(),
            author_name: config.author_name().to_string(),
            author_email: config.author_email().to_string(),
        }
    }

    fn contents_url(&self, path: &str) -> String {
        let base = format!(
            "{}/repos/{}/{}/contents",
            self.api_base, self.repo_owner, self.repo_name
        );
        if path.is_empty() {
            base
        } else {
            let encoded = path
                .split('/')
                .map(|segment| urlencoding::encode(segment).into_owned())
                .collect::<Vec<_>>()
                .join("/");
            format!("{base}/{encoded}")
        }
    }

    fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn get_contents(&self, path: &str) -> SyncResult<serde_json::Value> {
        let response = self
            .agent
            .get(&self.contents_url(path))
            .set("Authorization", &self.authorization())
            .set("Accept", ACCEPT_HEADER)
            .set("X-GitHub-Api-Version", API_VERSION_HEADER)
            .query("ref", &self.branch)
            .call()
            .map_err(|err| map_api_error(err, path))?;

        response
            .into_json()
            .map_err(SyncError::MalformedResponse)
    }

    fn identity(&self) -> serde_json::Value {
        json!({ "name": self.author_name, "email": self.author_email })
    }

    /// The inline-content limit on the Contents API means larger files come
    /// back with an empty `content` and a pre-authorised `download_url`.
    fn fetch_download_url(&self, url: &str) -> SyncResult<Vec<u8>> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|err| map_api_error(err, url))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(SyncError::MalformedResponse)?;
        Ok(bytes)
    }
}

impl RemoteRepository for GithubClient {
    fn probe(&self, path: &str) -> SyncResult<Option<RemoteFileHandle>> {
        let value = match self.get_contents(path) {
            Ok(value) => value,
            Err(SyncError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };
        if value.is_array() {
            return Err(SyncError::InvalidInput(format!(
                "remote path is a directory: {path}"
            )));
        }
        let token = value
            .get("sha")
            .and_then(|sha| sha.as_str())
            .ok_or_else(|| malformed(format!("missing sha for {path}")))?;

        Ok(Some(RemoteFileHandle {
            path: path.to_string(),
            token: token.to_string(),
        }))
    }

    fn fetch(&self, path: &str) -> SyncResult<Vec<u8>> {
        let value = self.get_contents(path)?;
        if value.is_array() {
            return Err(SyncError::InvalidInput(format!(
                "remote path is a directory: {path}"
            )));
        }

        let content = value.get("content").and_then(|c| c.as_str()).unwrap_or("");
        let encoding = value.get("encoding").and_then(|e| e.as_str()).unwrap_or("");
        if encoding == "base64" && !content.is_empty() {
            return decode_base64_content(content);
        }
        if let Some(url) = value.get("download_url").and_then(|u| u.as_str()) {
            return self.fetch_download_url(url);
        }

        Err(malformed(format!(
            "no inline content or download url for {path}"
        )))
    }

    fn upsert(
        &self,
        path: &str,
        content: &[u8],
        token: Option<&str>,
        message: &str,
    ) -> SyncResult<()> {
        let mut body = json!({
            "message": message,
            "content": general_purpose::STANDARD.encode(content),
            "branch": self.branch,
            "committer": self.identity(),
            "author": self.identity(),
        });
        if let Some(token) = token {
            body["sha"] = json!(token);
        }

        self.agent
            .put(&self.contents_url(path))
            .set("Authorization", &self.authorization())
            .set("Accept", ACCEPT_HEADER)
            .set("X-GitHub-Api-Version", API_VERSION_HEADER)
            .send_json(body)
            .map_err(|err| map_api_error(err, path))?;
        Ok(())
    }

    fn remove(&self, path: &str, token: &str, message: &str) -> SyncResult<()> {
        let body = json!({
            "message": message,
            "sha": token,
            "branch": self.branch,
            "committer": self.identity(),
        });

        self.agent
            .delete(&self.contents_url(path))
            .set("Authorization", &self.authorization())
            .set("Accept", ACCEPT_HEADER)
            .set("X-GitHub-Api-Version", API_VERSION_HEADER)
            .send_json(body)
            .map_err(|err| map_api_error(err, path))?;
        Ok(())
    }

    fn list(&self, dir: &str) -> SyncResult<Vec<RemoteEntry>> {
        let value = self.get_contents(dir)?;
        let entries = if value.is_array() { value } else { json!([value]) };
        serde_json::from_value(entries)
            .map_err(|err| malformed(format!("unexpected listing shape: {err}")))
    }
}

fn map_api_error(err: ureq::Error, path: &str) -> SyncError {
    match err {
        ureq::Error::Status(404, _) => SyncError::NotFound(path.to_string()),
        ureq::Error::Status(409, _) => SyncError::Conflict(path.to_string()),
        ureq::Error::Status(code, response) => {
            let body = response
                .into_string()
                .unwrap_or_else(|_| "unreadable response body".to_string());
            SyncError::ApiStatus {
                code,
                path: path.to_string(),
                message: api_message(&body),
            }
        }
        ureq::Error::Transport(transport) => SyncError::Transport(Box::new(transport)),
    }
}

/// Pull the `message` field out of an API error body, falling back to the
/// (truncated) raw body when it is not the usual JSON shape.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|message| message.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            let mut text = body.trim().to_string();
            if text.len() > 200 {
                text.truncate(200);
                text.push_str("...");
            }
            text
        })
}

/// Contents API base64 arrives wrapped with newlines every 60 columns.
fn decode_base64_content(content: &str) -> SyncResult<Vec<u8>> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(SyncError::ContentDecode)
}

fn malformed(message: String) -> SyncError {
    SyncError::MalformedResponse(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}
