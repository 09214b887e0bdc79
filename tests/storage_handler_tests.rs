mod common;

use axum::http::{Method, StatusCode};
use common::{spawn_app, spawn_app_with, test_config};
use serde_json::json;
use site_admin::MockStorageService;

#[tokio::test]
async fn test_presigned_url_for_image() {
    let app = spawn_app();

    let (status, body) = app
        .admin(
            Method::POST,
            "/uploads/presigned",
            Some(json!({ "filename": "Cover Photo.PNG", "fileType": "image/png" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let key = body["resourceKey"].as_str().unwrap();
    assert!(key.starts_with("uploads/"));
    assert!(key.ends_with(".png"));
    assert!(body["uploadUrl"].as_str().unwrap().contains(key));
}

#[tokio::test]
async fn test_pdf_is_accepted_and_other_types_rejected() {
    let app = spawn_app();

    let (status, _) = app
        .admin(
            Method::POST,
            "/uploads/presigned",
            Some(json!({ "filename": "cv.pdf", "fileType": "application/pdf" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .admin(
            Method::POST,
            "/uploads/presigned",
            Some(json!({ "filename": "run.sh", "fileType": "application/x-sh" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_storage_outage_is_hidden_behind_500() {
    let app = spawn_app_with(test_config(), MockStorageService::new_failing());

    let (status, body) = app
        .admin(
            Method::POST,
            "/uploads/presigned",
            Some(json!({ "filename": "a.jpg", "fileType": "image/jpeg" })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Internal server error"));
}

#[tokio::test]
async fn test_upload_requires_session() {
    let app = spawn_app();
    let (status, _) = app
        .anonymous(
            Method::POST,
            "/uploads/presigned",
            Some(json!({ "filename": "a.jpg", "fileType": "image/jpeg" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
