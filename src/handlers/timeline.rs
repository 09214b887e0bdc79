//! Timeline handlers. The public listing is served from `AppState::timeline_cache`,
//! so every mutation here must invalidate it after a successful write.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{deleted, found};
use crate::{
    AppState,
    auth::AdminSession,
    error::AppResult,
    extract::ValidJson,
    models::{
        CreateTimelineItemRequest, SuccessResponse, TimelineItem, UpdateTimelineItemRequest,
    },
    reorder::{self, ReorderRequest, ReorderScope},
};

#[utoipa::path(
    get,
    path = "/public/timeline",
    tag = "timeline",
    responses((status = 200, description = "Timeline in display order", body = [TimelineItem]))
)]
pub async fn public_timeline(
    State(state): State<AppState>,
) -> AppResult<Json<Arc<Vec<TimelineItem>>>> {
    let items = state
        .timeline_cache
        .get_or_load(|| state.repo.list_timeline())
        .await?;
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/timeline",
    tag = "timeline",
    responses((status = 200, description = "Timeline in display order", body = [TimelineItem]))
)]
pub async fn list_timeline(State(state): State<AppState>) -> AppResult<Json<Vec<TimelineItem>>> {
    Ok(Json(state.repo.list_timeline().await?))
}

#[utoipa::path(
    post,
    path = "/timeline",
    tag = "timeline",
    request_body = CreateTimelineItemRequest,
    responses((status = 201, description = "Appended at the end", body = TimelineItem))
)]
pub async fn create_timeline_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateTimelineItemRequest>,
) -> AppResult<(StatusCode, Json<TimelineItem>)> {
    payload.validate()?;
    let item = state.repo.create_timeline_item(payload).await?;
    state.timeline_cache.invalidate().await;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/timeline/{id}",
    tag = "timeline",
    params(("id" = Uuid, Path, description = "Timeline item ID")),
    request_body = UpdateTimelineItemRequest,
    responses((status = 200, description = "Updated", body = TimelineItem))
)]
pub async fn update_timeline_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdateTimelineItemRequest>,
) -> AppResult<Json<TimelineItem>> {
    payload.validate()?;
    let item = found(state.repo.update_timeline_item(id, payload).await?, "timeline item")?;
    state.timeline_cache.invalidate().await;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/timeline/{id}",
    tag = "timeline",
    params(("id" = Uuid, Path, description = "Timeline item ID")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_timeline_item(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let status = deleted(state.repo.delete_timeline_item(id).await?, "timeline item")?;
    state.timeline_cache.invalidate().await;
    Ok(status)
}

/// reorder_timeline
///
/// Accepts `{items: [{_id, order}]}` (plain `id` works too). The cache is only
/// invalidated once the batch has been written.
#[utoipa::path(
    patch,
    path = "/timeline/reorder",
    tag = "timeline",
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Applied", body = SuccessResponse),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "No admin session"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn reorder_timeline(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ReorderRequest>,
) -> AppResult<Json<SuccessResponse>> {
    reorder::apply(state.repo.as_ref(), ReorderScope::Timeline, &payload).await?;
    state.timeline_cache.invalidate().await;
    Ok(Json(SuccessResponse::ok()))
}
