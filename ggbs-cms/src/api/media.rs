//! Media upload and ephemeral preview endpoints

use crate::sync::UploadedMedia;
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// POST /api/admin/media
///
/// **Request:** multipart form with a `file` field
/// **Response:** `{"url": "...", "durable": true|false}`
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadedMedia>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        if body.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        let uploaded = state
            .uploads
            .resolve_upload(&filename, &content_type, body)
            .await;
        return Ok(Json(uploaded));
    }

    Err(ApiError::BadRequest("Missing 'file' field".to_string()))
}

/// GET /preview/:id
pub async fn serve_preview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let object = state
        .previews
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Preview {} has expired", id)))?;

    Ok((
        [
            (header::CONTENT_TYPE, object.content_type),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
        object.body,
    )
        .into_response())
}
