use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::{deleted, found};
use crate::{
    AppState,
    auth::AdminSession,
    error::AppResult,
    extract::ValidJson,
    models::{CreateWhiteboardRequest, SaveWhiteboardRequest, Whiteboard},
};

#[utoipa::path(
    get,
    path = "/whiteboards",
    tag = "whiteboards",
    responses((status = 200, description = "Whiteboards by name", body = [Whiteboard]))
)]
pub async fn list_whiteboards(State(state): State<AppState>) -> AppResult<Json<Vec<Whiteboard>>> {
    Ok(Json(state.repo.list_whiteboards().await?))
}

#[utoipa::path(
    get,
    path = "/whiteboards/{slug}",
    tag = "whiteboards",
    params(("slug" = String, Path, description = "Whiteboard slug")),
    responses((status = 200, description = "Found", body = Whiteboard))
)]
pub async fn get_whiteboard(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Whiteboard>> {
    Ok(Json(found(state.repo.get_whiteboard(&slug).await?, "whiteboard")?))
}

#[utoipa::path(
    post,
    path = "/whiteboards",
    tag = "whiteboards",
    request_body = CreateWhiteboardRequest,
    responses(
        (status = 201, description = "Created", body = Whiteboard),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_whiteboard(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateWhiteboardRequest>,
) -> AppResult<(StatusCode, Json<Whiteboard>)> {
    payload.validate()?;
    let board = state.repo.create_whiteboard(payload).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

/// save_whiteboard
///
/// Replaces the drawing elements wholesale; the canvas always sends its full state.
#[utoipa::path(
    put,
    path = "/whiteboards/{slug}",
    tag = "whiteboards",
    params(("slug" = String, Path, description = "Whiteboard slug")),
    request_body = SaveWhiteboardRequest,
    responses((status = 200, description = "Saved", body = Whiteboard))
)]
pub async fn save_whiteboard(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidJson(payload): ValidJson<SaveWhiteboardRequest>,
) -> AppResult<Json<Whiteboard>> {
    payload.validate()?;
    let board = state.repo.save_whiteboard(&slug, payload.elements).await?;
    Ok(Json(found(board, "whiteboard")?))
}

#[utoipa::path(
    delete,
    path = "/whiteboards/{slug}",
    tag = "whiteboards",
    params(("slug" = String, Path, description = "Whiteboard slug")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_whiteboard(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_whiteboard(&slug).await?, "whiteboard")
}
