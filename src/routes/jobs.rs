use crate::{AppState, handlers::jobs};
use axum::{Router, routing::get};

/// Jobs Router Module
///
/// Called by the external scheduler. Each handler takes a `JobAuth<K>` extractor, so
/// the token check lives in the handler signature and no session layer is applied.
pub fn job_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs/health-check", get(jobs::health_check_job))
        .route("/jobs/today-board", get(jobs::today_board_job))
}
