mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{TODAY_TOKEN, spawn_app};
use serde_json::json;
use site_admin::{
    AppError, MemoryRepository,
    handlers::jobs::reset_today_board,
    models::{ClearOutcome, CreateWhiteboardRequest},
    repository::WhiteboardRepository,
};

async fn seed_today(repo: &MemoryRepository) {
    repo.create_whiteboard(CreateWhiteboardRequest {
        slug: "today".to_string(),
        name: "Today".to_string(),
        elements: Some(json!([{ "type": "rect", "x": 1 }, { "type": "text", "text": "hi" }])),
    })
    .await
    .unwrap();
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

// --- Reset ---

#[tokio::test]
async fn test_first_reset_of_the_day_clears_the_board() {
    let repo = MemoryRepository::new();
    seed_today(&repo).await;

    let result = reset_today_board(&repo, "today", day(1)).await.unwrap();

    assert_eq!(result.status, ClearOutcome::Cleared);
    assert_eq!(result.cleared_on, day(1));
    let board = repo.get_whiteboard("today").await.unwrap().unwrap();
    assert_eq!(board.elements, json!([]));
    assert_eq!(board.cleared_on, Some(day(1)));
}

#[tokio::test]
async fn test_second_reset_same_day_writes_nothing() {
    let repo = MemoryRepository::new();
    seed_today(&repo).await;
    reset_today_board(&repo, "today", day(1)).await.unwrap();
    let after_first = repo.get_whiteboard("today").await.unwrap().unwrap();

    // Drawn on after the morning clear.
    repo.save_whiteboard("today", json!([{ "type": "arrow" }]))
        .await
        .unwrap();
    let drawn = repo.get_whiteboard("today").await.unwrap().unwrap();

    let result = reset_today_board(&repo, "today", day(1)).await.unwrap();

    assert_eq!(result.status, ClearOutcome::AlreadyCleared);
    let board = repo.get_whiteboard("today").await.unwrap().unwrap();
    assert_eq!(board.elements, json!([{ "type": "arrow" }]));
    assert_eq!(board.updated_at, drawn.updated_at);
    assert_eq!(board.cleared_on, after_first.cleared_on);
}

#[tokio::test]
async fn test_next_day_clears_again() {
    let repo = MemoryRepository::new();
    seed_today(&repo).await;
    reset_today_board(&repo, "today", day(1)).await.unwrap();
    repo.save_whiteboard("today", json!([{ "type": "arrow" }]))
        .await
        .unwrap();

    let result = reset_today_board(&repo, "today", day(2)).await.unwrap();

    assert_eq!(result.status, ClearOutcome::Cleared);
    let board = repo.get_whiteboard("today").await.unwrap().unwrap();
    assert_eq!(board.elements, json!([]));
    assert_eq!(board.cleared_on, Some(day(2)));
}

#[tokio::test]
async fn test_missing_board_is_not_found() {
    let repo = MemoryRepository::new();
    let result = reset_today_board(&repo, "today", day(1)).await;
    assert!(matches!(result, Err(AppError::NotFound("whiteboard"))));
}

// --- Job endpoint ---

#[tokio::test]
async fn test_job_endpoint_reports_cleared_then_already_cleared() {
    let app = spawn_app();
    seed_today(&app.repo).await;

    let (status, body) = app.job("/jobs/today-board", Some(TODAY_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["status"], json!("cleared"));
    assert_eq!(body["result"]["slug"], json!("today"));
    assert!(body["result"]["clearedOn"].is_string());

    let (status, body) = app.job("/jobs/today-board", Some(TODAY_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["status"], json!("already_cleared"));
}

#[tokio::test]
async fn test_job_endpoint_rejects_bad_tokens() {
    let app = spawn_app();
    seed_today(&app.repo).await;

    for token in [None, Some("nope"), Some(common::HEALTH_TOKEN)] {
        let (status, _) = app.job("/jobs/today-board", token).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // Nothing was cleared by the rejected calls.
    let board = app.repo.get_whiteboard("today").await.unwrap().unwrap();
    assert_eq!(board.cleared_on, None);
}

#[tokio::test]
async fn test_job_endpoint_without_board_is_not_found() {
    let app = spawn_app();
    let (status, body) = app.job("/jobs/today-board", Some(TODAY_TOKEN)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("whiteboard not found"));
}

#[tokio::test]
async fn test_job_endpoint_storage_failure() {
    let app = spawn_app();
    seed_today(&app.repo).await;
    app.repo.set_failing(true);

    let (status, _) = app.job("/jobs/today-board", Some(TODAY_TOKEN)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
