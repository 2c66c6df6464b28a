use crate::scratch::CommandError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("remote path not found: {0}")]
    NotFound(String),
    #[error("version conflict on {0}")]
    Conflict(String),
    #[error("transport failure talking to the remote api: {0}")]
    Transport(Box<ureq::Transport>),
    #[error("remote api returned {code} for {path}: {message}")]
    ApiStatus {
        code: u16,
        path: String,
        message: String,
    },
    #[error("failed to decode remote api response: {0}")]
    MalformedResponse(std::io::Error),
    #[error("failed to decode remote file content: {0}")]
    ContentDecode(base64::DecodeError),
    #[error("failed to read staged file {path}: {source}", path = path.display())]
    FileRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path}: {source}", path = path.display())]
    FileWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create scratch directory {path}: {source}", path = path.display())]
    ScratchDirCreation {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize manifest: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to clone the remote repository: {0}")]
    GitClone(CommandError),
    #[error("failed to narrow the sparse checkout: {0}")]
    GitSparse(CommandError),
    #[error("failed to register lfs tracking: {0}")]
    GitTrack(CommandError),
    #[error("failed to stage files in the scratch clone: {0}")]
    GitStage(CommandError),
    #[error("failed to commit in the scratch clone: {0}")]
    GitCommit(CommandError),
    #[error("git push was rejected: {0}")]
    GitPush(CommandError),
    #[error("failed to rebase onto the updated remote: {0}")]
    GitRebase(CommandError),
    #[error("git push failed after retry")]
    PushRetryExhausted(#[source] CommandError),
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
