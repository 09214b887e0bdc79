mod common;

use std::{net::SocketAddr, time::Duration};

use axum::{
    Router,
    http::{Method, StatusCode},
    routing::get,
};
use chrono::Utc;
use common::{HEALTH_TOKEN, TestApp, id_of, spawn_app, spawn_app_with, test_config};
use serde_json::json;
use site_admin::{
    AppConfig, HealthChecker, MemoryRepository, MockStorageService,
    models::{CreateResourceRequest, HealthCheckLog},
    repository::HealthRepository,
};
use tokio::net::TcpListener;
use uuid::Uuid;

// --- Probe targets ---

/// Starts a local server with one healthy, one failing and one hanging endpoint.
async fn spawn_target() -> SocketAddr {
    let app = Router::new()
        .route("/ok", get(|| async { "fine" }))
        .route(
            "/broken",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                "late"
            }),
        );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn add_resource(repo: &MemoryRepository, name: &str, url: String) -> Uuid {
    repo.create_resource(CreateResourceRequest {
        name: name.to_string(),
        url,
    })
    .await
    .unwrap()
    .id
}

// --- Sweep ---

#[tokio::test]
async fn test_sweep_records_one_log_per_resource_in_order() {
    let addr = spawn_target().await;
    let repo = MemoryRepository::new();
    let ok = add_resource(&repo, "ok", format!("http://{addr}/ok")).await;
    let broken = add_resource(&repo, "broken", format!("http://{addr}/broken")).await;
    let slow = add_resource(&repo, "slow", format!("http://{addr}/slow")).await;

    let checker = HealthChecker::new(Duration::from_millis(300));
    let results = checker.sweep(&repo, 35).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].resource_id, ok);
    assert!(results[0].is_healthy);
    assert_eq!(results[0].status, Some(200));
    assert_eq!(results[0].error, None);

    assert_eq!(results[1].resource_id, broken);
    assert!(!results[1].is_healthy);
    assert_eq!(results[1].status, Some(500));
    assert_eq!(results[1].error.as_deref(), Some("HTTP 500"));

    assert_eq!(results[2].resource_id, slow);
    assert!(!results[2].is_healthy);
    assert_eq!(results[2].status, None);
    assert_eq!(results[2].error.as_deref(), Some("Timed out after 300 ms"));
    assert!(results[2].response_time_ms < 3000);

    for id in [ok, broken, slow] {
        assert_eq!(repo.list_health_logs(id, 100).await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_unreachable_resource_is_unhealthy() {
    // Bind and drop a listener to get a port nothing listens on.
    let closed = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let repo = MemoryRepository::new();
    add_resource(&repo, "gone", format!("http://{closed}/")).await;

    let results = HealthChecker::new(Duration::from_millis(500))
        .sweep(&repo, 35)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert!(!results[0].is_healthy);
    assert_eq!(results[0].status, None);
    assert!(results[0].error.is_some());
}

#[tokio::test]
async fn test_sweep_prunes_expired_logs() {
    let addr = spawn_target().await;
    let repo = MemoryRepository::new();
    let id = add_resource(&repo, "ok", format!("http://{addr}/ok")).await;
    let stale = HealthCheckLog {
        id: Uuid::new_v4(),
        resource_id: id,
        status: Some(200),
        response_time_ms: 12,
        is_healthy: true,
        error: None,
        checked_at: Utc::now() - chrono::Duration::days(40),
    };
    repo.insert_health_log(&stale).await.unwrap();

    HealthChecker::new(Duration::from_millis(300))
        .sweep(&repo, 35)
        .await
        .unwrap();

    let logs = repo.list_health_logs(id, 100).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_ne!(logs[0].id, stale.id);
}

#[tokio::test]
async fn test_sweep_with_no_resources_is_empty() {
    let repo = MemoryRepository::new();
    let results = HealthChecker::new(Duration::from_millis(300))
        .sweep(&repo, 35)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_sweep_fails_when_resources_cannot_be_listed() {
    let repo = MemoryRepository::new();
    repo.set_failing(true);
    let result = HealthChecker::new(Duration::from_millis(300))
        .sweep(&repo, 35)
        .await;
    assert!(result.is_err());
}

// --- Job endpoint ---

async fn app_with_target() -> TestApp {
    let addr = spawn_target().await;
    let app = spawn_app();
    app.create(
        "/resources",
        json!({ "name": "site", "url": format!("http://{addr}/ok") }),
    )
    .await;
    app
}

async fn first_resource_id(app: &TestApp) -> Uuid {
    let (_, resources) = app.admin(Method::GET, "/resources", None).await;
    id_of(&resources[0]).parse().unwrap()
}

#[tokio::test]
async fn test_job_requires_matching_token() {
    let app = app_with_target().await;

    let (status, _) = app.job("/jobs/health-check", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.job("/jobs/health-check", Some("guess")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The other job's token does not open this one.
    let (status, _) = app.job("/jobs/health-check", Some(common::TODAY_TOKEN)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Rejected calls store nothing.
    let id = first_resource_id(&app).await;
    assert!(app.repo.list_health_logs(id, 100).await.unwrap().is_empty());

    let (status, body) = app.job("/jobs/health-check", Some(HEALTH_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["isHealthy"], json!(true));
}

#[tokio::test]
async fn test_job_disabled_without_configured_token() {
    let config = AppConfig {
        health_check_bearer_token: None,
        ..test_config()
    };
    let app = spawn_app_with(config, MockStorageService::new());
    let resource = app
        .create("/resources", json!({ "name": "site", "url": "http://127.0.0.1:1/" }))
        .await;

    let (status, _) = app.job("/jobs/health-check", Some(HEALTH_TOKEN)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let id: Uuid = id_of(&resource).parse().unwrap();
    assert!(app.repo.list_health_logs(id, 100).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_triggered_sweep_and_log_listing() {
    let app = app_with_target().await;
    let (_, resources) = app.admin(Method::GET, "/resources", None).await;
    let id = id_of(&resources[0]);

    let (status, body) = app
        .admin(Method::POST, "/resources/health-check", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"][0]["status"], json!(200));

    let (status, logs) = app
        .admin(Method::GET, &format!("/resources/{id}/logs"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 1);

    let (status, _) = app
        .anonymous(Method::POST, "/resources/health-check", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_sweep_writes_no_logs() {
    let app = app_with_target().await;

    let (status, _) = app
        .anonymous(Method::POST, "/resources/health-check", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let id = first_resource_id(&app).await;
    assert!(app.repo.list_health_logs(id, 100).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resource_validation_and_missing_logs() {
    let app = spawn_app();

    let (status, _) = app
        .admin(
            Method::POST,
            "/resources",
            Some(json!({ "name": "ftp", "url": "ftp://example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .admin(
            Method::GET,
            &format!("/resources/{}/logs", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
