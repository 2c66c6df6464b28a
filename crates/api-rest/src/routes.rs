//! File endpoints.
//!
//! Every handler is thin: parse and validate the request, stage the bytes,
//! hand the batch to the sync engine on a blocking worker, then discard
//! the staged blobs whichever way the sync went.

use std::path::PathBuf;

use axum::extract::{Multipart, Path as AxumPath, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use gitdrop_core::task::validate_dir_name;
use gitdrop_core::{FileTask, RemoteEntry, SyncAction, SyncOutcome, SyncResult, SyncStrategy};

use crate::error::ApiError;
use crate::staging::StagingStore;
use crate::validate::check_upload;
use crate::AppState;

/// Summary plus the outcome rows of a sync call.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub message: String,
    pub results: Vec<OutcomeDto>,
}

/// One outcome row. The clone path yields a single batch-level row, the
/// contents-API path one row per file.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDto {
    pub dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub strategy: String,
    pub meta: String,
}

impl From<SyncOutcome> for OutcomeDto {
    fn from(outcome: SyncOutcome) -> Self {
        let strategy = match outcome.strategy {
            SyncStrategy::ContentsApi => "contents-api",
            SyncStrategy::GitLfs => "git-lfs",
        };
        Self {
            dir: outcome.dir,
            file: outcome.file,
            strategy: strategy.to_string(),
            meta: outcome.meta,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    pub files: Vec<RemoteEntryDto>,
}

/// One entry of a remote directory listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEntryDto {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<RemoteEntry> for RemoteEntryDto {
    fn from(entry: RemoteEntry) -> Self {
        Self {
            name: entry.name,
            path: entry.path,
            sha: entry.sha,
            size: entry.size,
            kind: entry.kind,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub commit_message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub file_path: String,
    pub file_name: String,
    pub commit_message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncBatchEntry {
    pub file_path: String,
    pub file_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncBatchRequest {
    pub files: Vec<SyncBatchEntry>,
    #[serde(default)]
    pub dir_name: String,
    pub commit_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub dir: String,
}

/// Multipart form accepted by the upload and modify endpoints. Batch
/// endpoints repeat the file part.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: String,
    /// Target directory inside the repository; defaults to the root.
    pub dir_name: Option<String>,
    /// Commit message override (batch endpoints only).
    #[serde(rename = "commitMessage")]
    pub commit_message: Option<String>,
}

struct UploadedPart {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

struct ParsedUpload {
    files: Vec<UploadedPart>,
    dir_name: String,
    commit_message: Option<String>,
}

/// Pull the file parts and the `dir_name`/`commitMessage` text parts out
/// of a multipart body. Unknown parts are skipped.
async fn parse_upload(mut multipart: Multipart) -> Result<ParsedUpload, ApiError> {
    let mut files = Vec::new();
    let mut dir_name = String::new();
    let mut commit_message = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "files" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::bad_request("file part is missing a filename"))?;
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                files.push(UploadedPart {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "dir_name" => {
                dir_name = field.text().await.map_err(multipart_error)?;
            }
            "commitMessage" => {
                commit_message = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(ParsedUpload {
        files,
        dir_name,
        commit_message,
    })
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::new(err.status(), "Invalid request.", err.to_string())
}

/// Caller identity, as stamped by the upstream identity layer.
fn user_id(headers: &HeaderMap) -> String {
    headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("anonymous")
        .to_string()
}

/// Stage every part and turn it into a sync task. On any failure the blobs
/// staged so far are discarded before the error surfaces.
fn stage_tasks(
    staging: &StagingStore,
    context: &'static str,
    parts: &[UploadedPart],
    dir_name: &str,
    action: SyncAction,
) -> Result<(Vec<FileTask>, Vec<PathBuf>), ApiError> {
    let mut tasks = Vec::with_capacity(parts.len());
    let mut staged_paths: Vec<PathBuf> = Vec::with_capacity(parts.len());

    for part in parts {
        let staged = match staging.stage(dir_name, &part.file_name, &part.bytes) {
            Ok(staged) => staged,
            Err(err) => {
                discard_all(staging, &staged_paths);
                return Err(ApiError::internal(context, err.to_string()));
            }
        };
        staged_paths.push(staged.path.clone());

        match FileTask::new(staged.path, &part.file_name, staged.size, dir_name, action) {
            Ok(task) => tasks.push(task),
            Err(err) => {
                discard_all(staging, &staged_paths);
                return Err(ApiError::from_sync("Invalid request.", err));
            }
        }
    }

    Ok((tasks, staged_paths))
}

fn discard_all(staging: &StagingStore, paths: &[PathBuf]) {
    for path in paths {
        staging.discard(path);
    }
}

/// Run one sync engine call on a blocking worker.
async fn run_sync<T, F>(context: &'static str, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> SyncResult<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(op).await.map_err(|err| {
        tracing::error!("{} sync worker panicked: {:?}", context, err);
        ApiError::internal(context, "sync worker failed")
    })?;
    result.map_err(|err| ApiError::from_sync(context, err))
}

/// Validate, stage and sync a set of uploaded parts as one batch.
async fn sync_parts(
    state: &AppState,
    context: &'static str,
    parts: &[UploadedPart],
    dir_name: &str,
    action: SyncAction,
    commit_message: String,
) -> Result<Vec<OutcomeDto>, ApiError> {
    if parts.is_empty() {
        return Err(ApiError::bad_request("at least one file part is required"));
    }
    validate_dir_name(dir_name).map_err(|err| ApiError::from_sync("Invalid request.", err))?;
    for part in parts {
        check_upload(
            &part.file_name,
            part.content_type.as_deref(),
            part.bytes.len() as u64,
        )?;
    }

    let (tasks, staged_paths) = stage_tasks(&state.staging, context, parts, dir_name, action)?;

    let service = state.sync.clone();
    let result = run_sync(context, move || service.sync_batch(tasks, &commit_message)).await;
    discard_all(&state.staging, &staged_paths);
    let outcomes = result?;

    Ok(outcomes.into_iter().map(OutcomeDto::from).collect())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthResponse)
    )
)]
/// Health check endpoint for the REST API
///
/// Returns the current health status of the service. Used for monitoring
/// and load balancer health checks.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: "Gitdrop REST API is alive".into(),
    })
}

#[utoipa::path(
    post,
    path = "/api/files/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded and synchronised", body = SyncResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 413, description = "File over the size cap", body = ErrorBody),
        (status = 415, description = "File type not allowed", body = ErrorBody),
        (status = 500, description = "Sync failed", body = ErrorBody)
    )
)]
/// Upload one file and synchronise it into the repository
///
/// Expects a single `file` part plus an optional `dir_name` text part.
/// The commit message is derived from the `x-user-id` header.
///
/// # Errors
/// Returns `415` for a file outside the allowlist, `413` over the size
/// cap, `409` when conflict retries are exhausted, and `500` when the
/// sync itself fails.
#[axum::debug_handler]
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<SyncResponse>, ApiError> {
    let parsed = parse_upload(multipart).await?;
    if parsed.files.len() != 1 {
        return Err(ApiError::bad_request("exactly one file part is required"));
    }

    let message = format!("Upload by {}", user_id(&headers));
    let results = sync_parts(
        &state,
        "Error uploading file.",
        &parsed.files,
        &parsed.dir_name,
        SyncAction::Upload,
        message,
    )
    .await?;

    Ok(Json(SyncResponse {
        message: "File uploaded and synchronized successfully.".into(),
        results,
    }))
}

#[utoipa::path(
    post,
    path = "/api/files/upload/batch",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files uploaded and synchronised", body = SyncResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 500, description = "Sync failed", body = ErrorBody)
    )
)]
/// Upload several files and synchronise them as one batch
///
/// Repeats the `file` part once per file; all files share one `dir_name`
/// and one manifest. A `commitMessage` part overrides the default
/// `Batch upload by <user>` message.
#[axum::debug_handler]
pub async fn upload_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<SyncResponse>, ApiError> {
    let parsed = parse_upload(multipart).await?;
    let message = parsed
        .commit_message
        .unwrap_or_else(|| format!("Batch upload by {}", user_id(&headers)));
    let results = sync_parts(
        &state,
        "Error uploading files.",
        &parsed.files,
        &parsed.dir_name,
        SyncAction::Upload,
        message,
    )
    .await?;

    Ok(Json(SyncResponse {
        message: "Files uploaded and synchronized in a single commit.".into(),
        results,
    }))
}

#[utoipa::path(
    put,
    path = "/api/files/modify/{filename}",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    params(("filename" = String, Path, description = "Repository file name to replace")),
    responses(
        (status = 200, description = "File modified and synchronised", body = SyncResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 500, description = "Sync failed", body = ErrorBody)
    )
)]
/// Replace one repository file with freshly uploaded content
///
/// The target name comes from the route; the uploaded part supplies the
/// bytes. The part's own filename is ignored.
#[axum::debug_handler]
pub async fn modify_file(
    State(state): State<AppState>,
    AxumPath(filename): AxumPath<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<SyncResponse>, ApiError> {
    let mut parsed = parse_upload(multipart).await?;
    if parsed.files.len() != 1 {
        return Err(ApiError::bad_request("exactly one file part is required"));
    }
    let mut part = parsed.files.remove(0);
    part.file_name = filename;

    let message = format!("Modify by {}", user_id(&headers));
    let results = sync_parts(
        &state,
        "Error modifying file.",
        &[part],
        &parsed.dir_name,
        SyncAction::Modify,
        message,
    )
    .await?;

    Ok(Json(SyncResponse {
        message: "File modified and synchronized successfully.".into(),
        results,
    }))
}

#[utoipa::path(
    put,
    path = "/api/files/modify/batch",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files modified and synchronised", body = SyncResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 500, description = "Sync failed", body = ErrorBody)
    )
)]
/// Replace several repository files as one batch
#[axum::debug_handler]
pub async fn modify_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Json<SyncResponse>, ApiError> {
    let parsed = parse_upload(multipart).await?;
    let message = parsed
        .commit_message
        .unwrap_or_else(|| format!("Batch modify by {}", user_id(&headers)));
    let results = sync_parts(
        &state,
        "Error modifying files.",
        &parsed.files,
        &parsed.dir_name,
        SyncAction::Modify,
        message,
    )
    .await?;

    Ok(Json(SyncResponse {
        message: "Files modified and synchronized successfully.".into(),
        results,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/files/delete/{filename}",
    request_body = DeleteRequest,
    params(("filename" = String, Path, description = "Repository file name to delete")),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "No such file", body = ErrorBody),
        (status = 409, description = "Concurrent modification", body = ErrorBody),
        (status = 500, description = "Deletion failed", body = ErrorBody)
    )
)]
/// Delete one repository file
///
/// The optional JSON body carries a `commitMessage`; without one the
/// commit reads `Delete file`.
///
/// # Errors
/// Returns `404` when the file does not exist and `409` when another
/// writer touched it between probe and delete.
#[axum::debug_handler]
pub async fn delete_file(
    State(state): State<AppState>,
    AxumPath(filename): AxumPath<String>,
    body: Option<Json<DeleteRequest>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = body
        .and_then(|Json(req)| req.commit_message)
        .unwrap_or_else(|| "Delete file".to_string());

    let service = state.sync.clone();
    run_sync("Error deleting file.", move || {
        service.delete_file(&filename, &message)
    })
    .await?;

    Ok(Json(MessageResponse {
        message: "File deleted successfully.".into(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/files/retrieve/{filename}",
    params(("filename" = String, Path, description = "Repository file name to read")),
    responses(
        (status = 200, description = "Raw file content", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "No such file", body = ErrorBody),
        (status = 500, description = "Retrieval failed", body = ErrorBody)
    )
)]
/// Read one repository file and return its raw bytes
#[axum::debug_handler]
pub async fn retrieve_file(
    State(state): State<AppState>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Response, ApiError> {
    let service = state.sync.clone();
    let bytes = run_sync("Error retrieving file.", move || {
        service.read_file(&filename)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes).into_response())
}

#[utoipa::path(
    get,
    path = "/api/files/list",
    params(("dir" = Option<String>, Query, description = "Directory to list; repository root when absent")),
    responses(
        (status = 200, description = "Remote directory listing", body = ListResponse),
        (status = 500, description = "Listing failed", body = ErrorBody)
    )
)]
/// List the files currently in the repository
#[axum::debug_handler]
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let service = state.sync.clone();
    let entries = run_sync("Error listing files.", move || service.list_files(&query.dir)).await?;

    Ok(Json(ListResponse {
        files: entries.into_iter().map(RemoteEntryDto::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/files/sync",
    request_body = SyncRequest,
    responses(
        (status = 200, description = "File synchronised", body = MessageResponse),
        (status = 400, description = "Path outside the staging area", body = ErrorBody),
        (status = 409, description = "Conflict retries exhausted", body = ErrorBody),
        (status = 500, description = "Sync failed", body = ErrorBody)
    )
)]
/// Synchronise one already-staged file into the repository
///
/// `filePath` must point inside the staging area; `fileName` is the
/// repository path to write. Goes straight through the contents API
/// with conflict retry, no manifest.
#[axum::debug_handler]
pub async fn sync_file(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let staged = PathBuf::from(&req.file_path);
    if !state.staging.contains(&staged) {
        return Err(ApiError::bad_request(
            "filePath must point inside the staging area",
        ));
    }

    let message = req.commit_message.unwrap_or_else(|| "Sync file".to_string());
    let service = state.sync.clone();
    run_sync("Error synchronizing file.", move || {
        service.sync_file(&staged, &req.file_name, &message)
    })
    .await?;

    Ok(Json(MessageResponse {
        message: "File synchronized successfully.".into(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/files/sync/batch",
    request_body = SyncBatchRequest,
    responses(
        (status = 200, description = "Files synchronised", body = SyncResponse),
        (status = 400, description = "Malformed request", body = ErrorBody),
        (status = 500, description = "Sync failed", body = ErrorBody)
    )
)]
/// Synchronise several already-staged files as one batch
///
/// All entries share `dirName` and one manifest. Sizes are read from the
/// staged blobs, so a batch containing a large enough file routes through
/// the clone path like any other batch.
#[axum::debug_handler]
pub async fn sync_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SyncBatchRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    if req.files.is_empty() {
        return Err(ApiError::bad_request("files must not be empty"));
    }
    validate_dir_name(&req.dir_name).map_err(|err| ApiError::from_sync("Invalid request.", err))?;

    let mut tasks = Vec::with_capacity(req.files.len());
    for entry in &req.files {
        let staged = PathBuf::from(&entry.file_path);
        if !state.staging.contains(&staged) {
            return Err(ApiError::bad_request(format!(
                "filePath for {} must point inside the staging area",
                entry.file_name
            )));
        }
        let size = std::fs::metadata(&staged)
            .map_err(|err| {
                ApiError::bad_request(format!("staged file {} is unreadable: {}", entry.file_path, err))
            })?
            .len();
        let task = FileTask::new(staged, &entry.file_name, size, &req.dir_name, SyncAction::Upload)
            .map_err(|err| ApiError::from_sync("Invalid request.", err))?;
        tasks.push(task);
    }

    let message = req
        .commit_message
        .unwrap_or_else(|| format!("Batch sync by {}", user_id(&headers)));
    let service = state.sync.clone();
    let outcomes = run_sync("Error synchronizing files.", move || {
        service.sync_batch(tasks, &message)
    })
    .await?;

    Ok(Json(SyncResponse {
        message: "Files synchronized successfully.".into(),
        results: outcomes.into_iter().map(OutcomeDto::from).collect(),
    }))
}
