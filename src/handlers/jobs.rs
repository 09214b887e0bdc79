//! Endpoints called by the external scheduler. They authenticate with a per-job
//! bearer token (`JobAuth`) instead of an admin session.

use axum::{Json, extract::State};
use chrono::{NaiveDate, Utc};

use crate::{
    AppState,
    auth::{HealthCheckJob, JobAuth, TodayBoardJob},
    error::{AppError, AppResult},
    models::{ClearOutcome, HealthCheckSweepResponse, TodayBoardResponse, TodayBoardResult},
    repository::Repository,
};

#[utoipa::path(
    get,
    path = "/jobs/health-check",
    tag = "jobs",
    responses(
        (status = 200, description = "One log per probed resource", body = HealthCheckSweepResponse),
        (status = 401, description = "Missing, wrong or unconfigured job token")
    )
)]
pub async fn health_check_job(
    _job: JobAuth<HealthCheckJob>,
    State(state): State<AppState>,
) -> AppResult<Json<HealthCheckSweepResponse>> {
    let results = state
        .checker
        .sweep(state.repo.as_ref(), state.config.health_log_retention_days)
        .await?;
    Ok(Json(HealthCheckSweepResponse { results }))
}

/// today_board_job
///
/// Wipes the "today" whiteboard once per UTC day. Repeated calls on the same day
/// report `already_cleared` and write nothing.
#[utoipa::path(
    get,
    path = "/jobs/today-board",
    tag = "jobs",
    responses(
        (status = 200, description = "Cleared or already cleared today", body = TodayBoardResponse),
        (status = 401, description = "Missing, wrong or unconfigured job token"),
        (status = 404, description = "The today board does not exist")
    )
)]
pub async fn today_board_job(
    _job: JobAuth<TodayBoardJob>,
    State(state): State<AppState>,
) -> AppResult<Json<TodayBoardResponse>> {
    let today = Utc::now().date_naive();
    let result = reset_today_board(state.repo.as_ref(), &state.config.today_board_slug, today).await?;
    Ok(Json(TodayBoardResponse { result }))
}

/// Clears the board for `day` unless that already happened.
pub async fn reset_today_board(
    repo: &dyn Repository,
    slug: &str,
    day: NaiveDate,
) -> AppResult<TodayBoardResult> {
    let status = repo
        .clear_whiteboard_for_day(slug, day)
        .await?
        .ok_or(AppError::NotFound("whiteboard"))?;

    match status {
        ClearOutcome::Cleared => tracing::info!(%slug, %day, "today board cleared"),
        ClearOutcome::AlreadyCleared => tracing::info!(%slug, %day, "today board already cleared"),
    }

    Ok(TodayBoardResult {
        status,
        slug: slug.to_string(),
        cleared_on: day,
    })
}
