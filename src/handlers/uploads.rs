use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::AdminSession,
    error::{AppError, AppResult},
    extract::ValidJson,
    models::{PresignedUrlRequest, PresignedUrlResponse},
    storage::{is_allowed_content_type, upload_key},
};

/// get_presigned_url
///
/// Media pipeline for blog covers and whiteboard images. The browser uploads straight
/// to object storage with the returned URL (valid 10 minutes), then stores
/// `resourceKey` on the post or board.
#[utoipa::path(
    post,
    path = "/uploads/presigned",
    tag = "uploads",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "Presigned PUT URL", body = PresignedUrlResponse),
        (status = 400, description = "Unsupported file type"),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn get_presigned_url(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<PresignedUrlRequest>,
) -> AppResult<Json<PresignedUrlResponse>> {
    if !is_allowed_content_type(&payload.file_type) {
        return Err(AppError::validation(format!(
            "unsupported file type: {}",
            payload.file_type
        )));
    }

    let key = upload_key(&payload.filename);
    let upload_url = state
        .storage
        .get_presigned_upload_url(&key, &payload.file_type)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    Ok(Json(PresignedUrlResponse {
        upload_url,
        resource_key: key,
    }))
}
