//! HTTP endpoints: handwriting upload, ad-hoc translation and the user
//! directory.

use super::gateway::AppState;
use crate::error::ApiError;
use crate::ocr;
use crate::state::{Language, User};
use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub(super) struct RecognizedText {
    recognized_text: String,
}

/// `POST /upload-handwritten`: multipart field `file` holding an image.
pub(super) async fn upload_handwritten(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RecognizedText>, ApiError> {
    let result = recognize(&state, &mut multipart).await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(ApiError::OcrUnavailable) => "unavailable",
        Err(ApiError::Ocr(_)) => "failed",
        Err(_) => "rejected",
    };
    crate::metrics::record_ocr(outcome);

    match result {
        Ok(recognized_text) => Ok(Json(RecognizedText { recognized_text })),
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "Handwriting upload failed");
            Err(e)
        }
    }
}

async fn recognize(state: &AppState, multipart: &mut Multipart) -> Result<String, ApiError> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        if field.file_name().is_none_or(str::is_empty) {
            return Err(ApiError::NoSelectedFile);
        }
        file = Some(field.bytes().await?);
        break;
    }

    let image = file.ok_or(ApiError::MissingFilePart)?;
    if image.is_empty() {
        return Err(ApiError::EmptyUpload);
    }

    let engine = state.hub.ocr.as_ref().ok_or(ApiError::OcrUnavailable)?;
    let size = image.len();
    let detections = engine.detect(image).await?;
    let lines = ocr::cluster(&detections, state.hub.height_multiplier);
    let text = ocr::render(&lines);

    info!(
        bytes = size,
        detections = detections.len(),
        lines = lines.len(),
        "Handwriting recognized"
    );
    Ok(text)
}

#[derive(Debug, Deserialize)]
pub(super) struct TranslateRequest {
    text: String,
    source_lang: String,
    #[serde(default)]
    target_lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct TranslateResponse {
    translated: String,
    fallback: bool,
}

/// `POST /translate`: translate one text outside of any chat.
///
/// A failed translation answers with the original text and `fallback: true`.
pub(super) async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let source: Language = req.source_lang.parse()?;
    let target = match req.target_lang.as_deref() {
        Some(code) => code.parse()?,
        None => source.counterpart(),
    };

    let response = match state.hub.gateway.try_translate(&req.text, source, target).await {
        Ok(translated) => TranslateResponse {
            translated,
            fallback: false,
        },
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "Translation failed, returning original");
            TranslateResponse {
                translated: req.text,
                fallback: true,
            }
        }
    };
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub(super) struct RegisterRequest {
    username: String,
    language: String,
}

/// `POST /register`: add a user to the directory.
pub(super) async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let language: Language = req.language.parse()?;
    let user = state.hub.directory.register(req.username.trim(), language)?;
    info!(username = %user.username, language = %user.language, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Serialize)]
pub(super) struct UserStatus {
    #[serde(flatten)]
    user: User,
    online: bool,
}

/// `GET /users`: every known user and whether someone has joined as them.
pub(super) async fn list_users(State(state): State<AppState>) -> Json<Vec<UserStatus>> {
    use crate::state::UserDirectory;

    let users = state
        .hub
        .directory
        .list_all()
        .into_iter()
        .map(|user| UserStatus {
            online: state.hub.rooms.is_joined(&user.username),
            user,
        })
        .collect();
    Json(users)
}
