use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{deleted, found};
use crate::{
    AppState,
    auth::AdminSession,
    error::{AppError, AppResult},
    extract::ValidJson,
    models::{CreateEventRequest, Event, EventRange, UpdateEventRequest},
};

/// list_events
///
/// Events overlapping the optional `[from, to)` window, by start time.
#[utoipa::path(
    get,
    path = "/calendar/events",
    tag = "calendar",
    params(EventRange),
    responses(
        (status = 200, description = "Events", body = [Event]),
        (status = 400, description = "`to` before `from`")
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(range): Query<EventRange>,
) -> AppResult<Json<Vec<Event>>> {
    if let (Some(from), Some(to)) = (range.from, range.to)
        && to < from
    {
        return Err(AppError::validation("to must not be before from"));
    }
    Ok(Json(state.repo.list_events(range).await?))
}

#[utoipa::path(
    get,
    path = "/calendar/events/{id}",
    tag = "calendar",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses((status = 200, description = "Found", body = Event))
)]
pub async fn get_event(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Event>> {
    Ok(Json(found(state.repo.get_event(id).await?, "event")?))
}

#[utoipa::path(
    post,
    path = "/calendar/events",
    tag = "calendar",
    request_body = CreateEventRequest,
    responses((status = 201, description = "Created", body = Event))
)]
pub async fn create_event(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<Event>)> {
    payload.validate()?;
    let event = state.repo.create_event(payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// update_event
///
/// Merges the partial update into the stored event first, so a range check covers a
/// change of only `startsAt` or only `endsAt`.
#[utoipa::path(
    put,
    path = "/calendar/events/{id}",
    tag = "calendar",
    params(("id" = Uuid, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated", body = Event),
        (status = 400, description = "Range would end before it starts")
    )
)]
pub async fn update_event(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdateEventRequest>,
) -> AppResult<Json<Event>> {
    payload.validate()?;
    let mut event = found(state.repo.get_event(id).await?, "event")?;
    payload.apply(&mut event)?;
    Ok(Json(found(state.repo.update_event(event).await?, "event")?))
}

#[utoipa::path(
    delete,
    path = "/calendar/events/{id}",
    tag = "calendar",
    params(("id" = Uuid, Path, description = "Event ID")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_event(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_event(id).await?, "event")
}
