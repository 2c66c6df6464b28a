//! Error mapping at the HTTP boundary.
//!
//! Translates [`SyncError`] values raised by the sync engine into an HTTP
//! status plus the JSON failure body every endpoint returns on error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gitdrop_core::SyncError;
use serde::Serialize;
use utoipa::ToSchema;

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Summary of the operation that failed.
    pub message: String,
    /// Underlying error detail.
    pub error: String,
}

/// HTTP-facing error: a status code plus the structured failure body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: String,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid request.", detail)
    }

    pub fn payload_too_large(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "File too large.", detail)
    }

    pub fn unsupported_type(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "File type not allowed.", detail)
    }

    pub fn internal(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, detail)
    }

    /// Map a sync failure onto a response, keeping the route's summary line.
    ///
    /// Not-found, conflict and invalid-input failures keep their client
    /// status; everything else is logged and surfaces as a 500.
    pub fn from_sync(message: &str, err: SyncError) -> Self {
        let status = match &err {
            SyncError::NotFound(_) => StatusCode::NOT_FOUND,
            SyncError::Conflict(_) => StatusCode::CONFLICT,
            SyncError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("{} {:?}", message, err);
        }
        Self::new(status, message, err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            error: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}
