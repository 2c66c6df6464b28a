//! # API REST
//!
//! REST API implementation for Gitdrop.
//!
//! Handles:
//! - HTTP endpoints with axum (multipart uploads, JSON sync calls)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (upload validation, staging, error mapping, CORS)
//!
//! Sync semantics live in `gitdrop-core`; this crate stays thin around them.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod routes;
pub mod staging;
pub mod validate;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use gitdrop_core::SyncService;

use staging::StagingStore;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<SyncService>,
    pub staging: Arc<StagingStore>,
}

/// Maximum total request size, sized for a batch of uploads plus
/// multipart overhead. Per-file limits are enforced separately.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health,
        routes::upload_file,
        routes::upload_batch,
        routes::modify_file,
        routes::modify_batch,
        routes::delete_file,
        routes::retrieve_file,
        routes::list_files,
        routes::sync_file,
        routes::sync_batch,
    ),
    components(schemas(
        routes::SyncResponse,
        routes::OutcomeDto,
        routes::MessageResponse,
        routes::HealthResponse,
        routes::ListResponse,
        routes::RemoteEntryDto,
        routes::DeleteRequest,
        routes::SyncRequest,
        routes::SyncBatchRequest,
        routes::SyncBatchEntry,
        routes::UploadForm,
        error::ErrorBody,
    ))
)]
struct ApiDoc;

/// Build the application router: file routes, swagger docs, permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/files/upload", post(routes::upload_file))
        .route("/api/files/upload/batch", post(routes::upload_batch))
        .route("/api/files/modify/batch", put(routes::modify_batch))
        .route("/api/files/modify/:filename", put(routes::modify_file))
        .route("/api/files/delete/:filename", delete(routes::delete_file))
        .route("/api/files/retrieve/:filename", get(routes::retrieve_file))
        .route("/api/files/list", get(routes::list_files))
        .route("/api/files/sync", post(routes::sync_file))
        .route("/api/files/sync/batch", post(routes::sync_batch))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
