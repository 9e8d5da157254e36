//! Unified error handling for the relay.
//!
//! WebSocket event errors become `error` events on the offending connection;
//! HTTP endpoint errors become `{"error": "..."}` bodies. Both carry a static
//! code used as a metrics label.

use crate::network::protocol::ServerEvent;
use crate::ocr::OcrError;
use crate::state::DirectoryError;
use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ============================================================================
// Handler Errors (WebSocket events)
// ============================================================================

/// Errors that can occur while handling a client event.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("join a room before sending messages")]
    NotJoined,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("malformed event: {0}")]
    Malformed(String),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotJoined => "not_joined",
            Self::EmptyUsername => "empty_username",
            Self::EmptyMessage => "empty_message",
            Self::Malformed(_) => "malformed",
        }
    }

    /// Convert to the `error` event sent back to the client.
    pub fn to_event(&self) -> ServerEvent {
        ServerEvent::error(self.error_code(), self.to_string())
    }
}

/// Result type for event handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// API Errors (HTTP endpoints)
// ============================================================================

/// Errors surfaced by the HTTP endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file part")]
    MissingFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("Handwriting recognition is not configured")]
    OcrUnavailable,

    #[error("Handwriting recognition failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("{0}")]
    Directory(#[from] DirectoryError),
}

impl ApiError {
    /// Get a static error code string for metrics labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFilePart => "missing_file_part",
            Self::NoSelectedFile => "no_selected_file",
            Self::EmptyUpload => "empty_upload",
            Self::OcrUnavailable => "ocr_unavailable",
            Self::Ocr(e) => e.error_code(),
            Self::Multipart(_) => "multipart",
            Self::UnknownLanguage(_) => "unknown_language",
            Self::Directory(e) => e.error_code(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFilePart
            | Self::NoSelectedFile
            | Self::EmptyUpload
            | Self::UnknownLanguage(_)
            | Self::Directory(DirectoryError::InvalidUsername(_)) => StatusCode::BAD_REQUEST,
            Self::Multipart(e) => e.status(),
            Self::Directory(DirectoryError::AlreadyExists(_)) => StatusCode::CONFLICT,
            Self::OcrUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Ocr(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<crate::state::UnknownLanguage> for ApiError {
    fn from(e: crate::state::UnknownLanguage) -> Self {
        Self::UnknownLanguage(e.0)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
