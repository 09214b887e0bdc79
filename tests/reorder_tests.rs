mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, id_of, spawn_app};
use serde_json::{Value, json};

// --- Helpers ---

async fn timeline_item(app: &TestApp, title: &str) -> String {
    let item = app
        .create("/timeline", json!({ "title": title, "date": "2024-03-01" }))
        .await;
    id_of(&item)
}

async fn public_titles(app: &TestApp) -> Vec<String> {
    let (status, body) = app.anonymous(Method::GET, "/public/timeline", None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

async fn board_detail(app: &TestApp, board_id: &str) -> Value {
    let (status, body) = app
        .admin(Method::GET, &format!("/kanban/boards/{board_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    body
}

// --- Timeline ---

#[tokio::test]
async fn test_timeline_reorder_accepts_underscore_ids_and_refreshes_public_listing() {
    let app = spawn_app();
    let a = timeline_item(&app, "a").await;
    let b = timeline_item(&app, "b").await;

    // Warm the cache so the reorder has to invalidate it.
    assert_eq!(public_titles(&app).await, ["a", "b"]);

    let (status, body) = app
        .admin(
            Method::PATCH,
            "/timeline/reorder",
            Some(json!({ "items": [{ "_id": a, "order": 2 }, { "_id": b, "order": 1 }] })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(public_titles(&app).await, ["b", "a"]);
}

#[tokio::test]
async fn test_reorder_is_idempotent() {
    let app = spawn_app();
    let a = timeline_item(&app, "a").await;
    let b = timeline_item(&app, "b").await;
    let c = timeline_item(&app, "c").await;
    let payload = json!({ "items": [
        { "id": a, "order": 3 },
        { "id": b, "order": 1 },
        { "id": c, "order": 2 },
    ] });

    for _ in 0..2 {
        let (status, _) = app
            .admin(Method::PATCH, "/timeline/reorder", Some(payload.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(public_titles(&app).await, ["b", "c", "a"]);
    }
}

#[tokio::test]
async fn test_unknown_ids_are_ignored() {
    let app = spawn_app();
    timeline_item(&app, "a").await;
    let b = timeline_item(&app, "b").await;

    let (status, _) = app
        .admin(
            Method::PATCH,
            "/timeline/reorder",
            Some(json!({ "items": [
                { "id": "00000000-0000-0000-0000-00000000beef", "order": -5 },
                { "id": b, "order": -1 },
            ] })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(public_titles(&app).await, ["b", "a"]);
}

#[tokio::test]
async fn test_empty_batch_succeeds() {
    let app = spawn_app();
    let (status, body) = app
        .admin(Method::PATCH, "/timeline/reorder", Some(json!({ "items": [] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn test_malformed_payloads_are_rejected() {
    let app = spawn_app();
    let a = timeline_item(&app, "a").await;

    let payloads = [
        json!({ "items": { "id": a, "order": 1 } }),
        json!({}),
        json!({ "items": [{ "id": a }] }),
        json!({ "items": [{ "id": "not-a-uuid", "order": 1 }] }),
        json!({ "items": [{ "id": a, "order": 1 }, { "id": a, "order": 2 }] }),
    ];

    for payload in payloads {
        let (status, body) = app
            .admin(Method::PATCH, "/timeline/reorder", Some(payload.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload} was accepted");
        assert_eq!(body["success"], json!(false));
    }

    let (_, items) = app.admin(Method::GET, "/timeline", None).await;
    assert_eq!(items[0]["order"], json!(0));
}

#[tokio::test]
async fn test_reorder_requires_session() {
    let app = spawn_app();
    let a = timeline_item(&app, "a").await;
    let b = timeline_item(&app, "b").await;

    let (status, _) = app
        .anonymous(
            Method::PATCH,
            "/timeline/reorder",
            Some(json!({ "items": [{ "id": a, "order": 9 }, { "id": b, "order": 0 }] })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(public_titles(&app).await, ["a", "b"]);
}

#[tokio::test]
async fn test_storage_failure_is_internal_error() {
    let app = spawn_app();
    let a = timeline_item(&app, "a").await;
    app.repo.set_failing(true);

    let (status, body) = app
        .admin(
            Method::PATCH,
            "/timeline/reorder",
            Some(json!({ "items": [{ "id": a, "order": 4 }] })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "success": false, "error": "Internal server error" }));
}

#[tokio::test]
async fn test_append_after_reorder_to_max_order() {
    let app = spawn_app();
    let a = timeline_item(&app, "a").await;

    let (status, _) = app
        .admin(
            Method::PATCH,
            "/timeline/reorder",
            Some(json!({ "items": [{ "_id": a, "order": i32::MAX }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let b = app
        .create("/timeline", json!({ "title": "b", "date": "2024-03-02" }))
        .await;
    assert_eq!(b["order"], json!(i32::MAX));
    assert_eq!(public_titles(&app).await, ["a", "b"]);
}

// --- Kanban ---

#[tokio::test]
async fn test_card_moves_between_columns() {
    let app = spawn_app();
    let board = id_of(&app.create("/kanban/boards", json!({ "name": "Work" })).await);
    let todo = id_of(
        &app.create(&format!("/kanban/boards/{board}/columns"), json!({ "name": "Todo" }))
            .await,
    );
    let done = id_of(
        &app.create(&format!("/kanban/boards/{board}/columns"), json!({ "name": "Done" }))
            .await,
    );
    let card = id_of(
        &app.create(
            &format!("/kanban/boards/{board}/cards"),
            json!({ "columnId": todo, "title": "Ship it" }),
        )
        .await,
    );

    let (status, _) = app
        .admin(
            Method::PATCH,
            &format!("/kanban/boards/{board}/cards/reorder"),
            Some(json!({ "items": [{ "id": card, "order": 0, "columnId": done }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let detail = board_detail(&app, &board).await;
    assert_eq!(detail["cards"][0]["columnId"], json!(done));
    assert_eq!(detail["cards"][0]["order"], json!(0));
}

#[tokio::test]
async fn test_column_reorder_ignores_other_boards() {
    let app = spawn_app();
    let first = id_of(&app.create("/kanban/boards", json!({ "name": "One" })).await);
    let second = id_of(&app.create("/kanban/boards", json!({ "name": "Two" })).await);
    let foreign = id_of(
        &app.create(&format!("/kanban/boards/{second}/columns"), json!({ "name": "X" }))
            .await,
    );

    let (status, _) = app
        .admin(
            Method::PATCH,
            &format!("/kanban/boards/{first}/columns/reorder"),
            Some(json!({ "items": [{ "id": foreign, "order": 7 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let detail = board_detail(&app, &second).await;
    assert_eq!(detail["columns"][0]["order"], json!(0));
}

#[tokio::test]
async fn test_column_id_rejected_outside_card_reorder() {
    let app = spawn_app();
    let board = id_of(&app.create("/kanban/boards", json!({ "name": "Work" })).await);
    let column = id_of(
        &app.create(&format!("/kanban/boards/{board}/columns"), json!({ "name": "Todo" }))
            .await,
    );

    let (status, _) = app
        .admin(
            Method::PATCH,
            &format!("/kanban/boards/{board}/columns/reorder"),
            Some(json!({ "items": [{ "id": column, "order": 1, "columnId": column }] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
