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
    models::{CreateResourceRequest, HealthCheckLog, HealthCheckSweepResponse, Resource},
};

/// Most recent logs returned per resource.
const LOG_PAGE: i64 = 100;

#[utoipa::path(
    get,
    path = "/resources",
    tag = "resources",
    responses((status = 200, description = "Monitored resources in creation order", body = [Resource]))
)]
pub async fn list_resources(State(state): State<AppState>) -> AppResult<Json<Vec<Resource>>> {
    Ok(Json(state.repo.list_resources().await?))
}

#[utoipa::path(
    post,
    path = "/resources",
    tag = "resources",
    request_body = CreateResourceRequest,
    responses(
        (status = 201, description = "Created", body = Resource),
        (status = 400, description = "URL is not http(s)")
    )
)]
pub async fn create_resource(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateResourceRequest>,
) -> AppResult<(StatusCode, Json<Resource>)> {
    payload.validate()?;
    let resource = state.repo.create_resource(payload).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

#[utoipa::path(
    delete,
    path = "/resources/{id}",
    tag = "resources",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses((status = 204, description = "Deleted with its logs"))
)]
pub async fn delete_resource(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_resource(id).await?, "resource")
}

#[utoipa::path(
    get,
    path = "/resources/{id}/logs",
    tag = "resources",
    params(("id" = Uuid, Path, description = "Resource ID")),
    responses((status = 200, description = "Newest first, at most 100", body = [HealthCheckLog]))
)]
pub async fn list_resource_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<HealthCheckLog>>> {
    found(state.repo.get_resource(id).await?, "resource")?;
    Ok(Json(state.repo.list_health_logs(id, LOG_PAGE).await?))
}

/// run_health_check
///
/// Admin-triggered sweep. Same work as the scheduled `/jobs/health-check`.
#[utoipa::path(
    post,
    path = "/resources/health-check",
    tag = "resources",
    responses(
        (status = 200, description = "One log per probed resource", body = HealthCheckSweepResponse),
        (status = 401, description = "No admin session"),
        (status = 500, description = "Resources could not be listed")
    )
)]
pub async fn run_health_check(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<HealthCheckSweepResponse>> {
    let results = state
        .checker
        .sweep(state.repo.as_ref(), state.config.health_log_retention_days)
        .await?;
    Ok(Json(HealthCheckSweepResponse { results }))
}
