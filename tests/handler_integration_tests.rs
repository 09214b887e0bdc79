mod common;

use axum::http::{Method, StatusCode};
use common::{id_of, spawn_app};
use serde_json::{Value, json};
use site_admin::{handlers::api_keys::hash_key, repository::InboxRepository};
use uuid::Uuid;

fn len(json: &Value) -> usize {
    json.as_array().map_or(0, Vec::len)
}

// --- Blog ---

#[tokio::test]
async fn test_blog_publish_flow() {
    let app = spawn_app();
    let post = app
        .create(
            "/blog/posts",
            json!({ "slug": "hello-world", "title": "Hello", "content": "# Hi" }),
        )
        .await;
    let id = id_of(&post);
    assert_eq!(post["published"], json!(false));
    assert_eq!(post["publishedAt"], Value::Null);

    // Drafts stay private.
    let (_, public) = app.anonymous(Method::GET, "/public/blog/posts", None).await;
    assert_eq!(len(&public), 0);
    let (status, _) = app
        .anonymous(Method::GET, "/public/blog/posts/hello-world", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .anonymous(Method::POST, "/public/blog/posts/hello-world/views", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, updated) = app
        .admin(
            Method::PUT,
            &format!("/blog/posts/{id}"),
            Some(json!({ "published": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["publishedAt"].is_string());

    let (status, public) = app
        .anonymous(Method::GET, "/public/blog/posts/hello-world", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public["title"], json!("Hello"));

    // Unpublishing keeps the first publication date.
    let (_, unpublished) = app
        .admin(
            Method::PUT,
            &format!("/blog/posts/{id}"),
            Some(json!({ "published": false })),
        )
        .await;
    assert_eq!(unpublished["publishedAt"], updated["publishedAt"]);
}

#[tokio::test]
async fn test_blog_slug_rules() {
    let app = spawn_app();
    app.create("/blog/posts", json!({ "slug": "taken", "title": "One" }))
        .await;

    let (status, body) = app
        .admin(
            Method::POST,
            "/blog/posts",
            Some(json!({ "slug": "taken", "title": "Two" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], json!(false));

    let (status, _) = app
        .admin(
            Method::POST,
            "/blog/posts",
            Some(json!({ "slug": "Not A Slug", "title": "Three" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blog_views_and_comment_moderation() {
    let app = spawn_app();
    let post = app
        .create(
            "/blog/posts",
            json!({ "slug": "notes", "title": "Notes", "published": true }),
        )
        .await;
    let post_id = id_of(&post);

    for expected in 1..=2 {
        let (status, view) = app
            .anonymous(Method::POST, "/public/blog/posts/notes/views", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["views"], json!(expected));
    }
    let (_, views) = app.admin(Method::GET, "/blog/views", None).await;
    assert_eq!(views[0]["slug"], json!("notes"));
    assert_eq!(views[0]["views"], json!(2));

    let (status, comment) = app
        .anonymous(
            Method::POST,
            "/public/blog/posts/notes/comments",
            Some(json!({ "authorName": "Grace", "body": "Nice post" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(comment["approved"], json!(false));
    let comment_id = id_of(&comment);

    let (_, visible) = app
        .anonymous(Method::GET, "/public/blog/posts/notes/comments", None)
        .await;
    assert_eq!(len(&visible), 0);

    let (status, _) = app
        .admin(
            Method::PATCH,
            &format!("/blog/comments/{comment_id}"),
            Some(json!({ "approved": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, visible) = app
        .anonymous(Method::GET, "/public/blog/posts/notes/comments", None)
        .await;
    assert_eq!(len(&visible), 1);
    assert_eq!(visible[0]["authorName"], json!("Grace"));

    // Deleting the post takes its comments and counter with it.
    let (status, _) = app
        .admin(Method::DELETE, &format!("/blog/posts/{post_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, comments) = app.admin(Method::GET, "/blog/comments", None).await;
    assert_eq!(len(&comments), 0);
    let (_, views) = app.admin(Method::GET, "/blog/views", None).await;
    assert_eq!(len(&views), 0);
    let (status, _) = app
        .admin(Method::GET, &format!("/blog/posts/{post_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Kanban ---

#[tokio::test]
async fn test_kanban_appends_and_cascades() {
    let app = spawn_app();
    let board = id_of(&app.create("/kanban/boards", json!({ "name": "Home" })).await);
    let columns = format!("/kanban/boards/{board}/columns");
    let first = app.create(&columns, json!({ "name": "Todo" })).await;
    let second = app.create(&columns, json!({ "name": "Doing" })).await;
    assert_eq!(first["order"], json!(0));
    assert_eq!(second["order"], json!(1));

    let cards = format!("/kanban/boards/{board}/cards");
    let todo = id_of(&first);
    for title in ["one", "two"] {
        app.create(&cards, json!({ "columnId": todo, "title": title }))
            .await;
    }

    let (_, detail) = app
        .admin(Method::GET, &format!("/kanban/boards/{board}"), None)
        .await;
    assert_eq!(len(&detail["columns"]), 2);
    assert_eq!(len(&detail["cards"]), 2);
    assert_eq!(detail["cards"][1]["order"], json!(1));

    // Deleting a column removes its cards.
    let (status, _) = app
        .admin(Method::DELETE, &format!("{columns}/{todo}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, detail) = app
        .admin(Method::GET, &format!("/kanban/boards/{board}"), None)
        .await;
    assert_eq!(len(&detail["cards"]), 0);

    let (status, _) = app
        .admin(Method::DELETE, &format!("/kanban/boards/{board}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .admin(Method::GET, &format!("/kanban/boards/{board}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_card_must_target_a_column_of_the_board() {
    let app = spawn_app();
    let home = id_of(&app.create("/kanban/boards", json!({ "name": "Home" })).await);
    let work = id_of(&app.create("/kanban/boards", json!({ "name": "Work" })).await);
    let work_column = id_of(
        &app.create(&format!("/kanban/boards/{work}/columns"), json!({ "name": "Todo" }))
            .await,
    );

    let (status, _) = app
        .admin(
            Method::POST,
            &format!("/kanban/boards/{home}/cards"),
            Some(json!({ "columnId": work_column, "title": "Lost" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .admin(
            Method::POST,
            &format!("/kanban/boards/{}/columns", Uuid::new_v4()),
            Some(json!({ "name": "Nowhere" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Notes ---

#[tokio::test]
async fn test_notes_folders_and_filtering() {
    let app = spawn_app();
    let folder = id_of(&app.create("/notes/folders", json!({ "name": "Ideas" })).await);
    let inside = id_of(
        &app.create("/notes", json!({ "folderId": folder, "title": "In folder" }))
            .await,
    );
    app.create("/notes", json!({ "title": "Loose", "pinned": true }))
        .await;

    let (_, all) = app.admin(Method::GET, "/notes", None).await;
    assert_eq!(len(&all), 2);
    assert_eq!(all[0]["title"], json!("Loose"));

    let (_, filtered) = app
        .admin(Method::GET, &format!("/notes?folderId={folder}"), None)
        .await;
    assert_eq!(len(&filtered), 1);
    assert_eq!(filtered[0]["id"], json!(inside));

    let (status, _) = app
        .admin(Method::DELETE, &format!("/notes/folders/{folder}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, note) = app
        .admin(Method::GET, &format!("/notes/{inside}"), None)
        .await;
    assert_eq!(note["folderId"], Value::Null);
}

#[tokio::test]
async fn test_note_can_be_moved_back_to_root() {
    let app = spawn_app();
    let folder = id_of(&app.create("/notes/folders", json!({ "name": "Work" })).await);
    let note = id_of(
        &app.create("/notes", json!({ "folderId": folder, "title": "Plan" }))
            .await,
    );

    let (status, moved) = app
        .admin(
            Method::PUT,
            &format!("/notes/{note}"),
            Some(json!({ "folderId": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["folderId"], Value::Null);
    assert_eq!(moved["title"], json!("Plan"));
}

// --- Contacts ---

#[tokio::test]
async fn test_contacts_crud() {
    let app = spawn_app();

    let (status, _) = app
        .admin(
            Method::POST,
            "/contacts",
            Some(json!({ "name": "Bad", "email": "not-an-email" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let contact = app
        .create(
            "/contacts",
            json!({ "name": "Ada", "email": "ada@example.com", "company": "Engines" }),
        )
        .await;
    let id = id_of(&contact);

    let (status, updated) = app
        .admin(
            Method::PUT,
            &format!("/contacts/{id}"),
            Some(json!({ "name": "Ada L.", "phone": "+44 1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], json!("Ada L."));

    let (status, _) = app
        .admin(Method::DELETE, &format!("/contacts/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .admin(Method::DELETE, &format!("/contacts/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Inbox ---

#[tokio::test]
async fn test_contact_form_lands_in_inbox() {
    let app = spawn_app();
    let (status, _) = app
        .anonymous(
            Method::POST,
            "/public/contact",
            Some(json!({ "name": "Reader", "email": "reader@example.com", "body": "Hello!" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .anonymous(
            Method::POST,
            "/public/contact",
            Some(json!({ "name": "Spam", "email": "nope", "body": "x" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, messages) = app.admin(Method::GET, "/inbox/messages", None).await;
    assert_eq!(len(&messages), 1);
    assert_eq!(messages[0]["read"], json!(false));
    let id = id_of(&messages[0]);

    let (status, message) = app
        .admin(
            Method::PATCH,
            &format!("/inbox/messages/{id}"),
            Some(json!({ "read": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(message["read"], json!(true));
}

#[tokio::test]
async fn test_email_account_password_never_returned() {
    let app = spawn_app();
    let account = app
        .create(
            "/inbox/accounts",
            json!({
                "label": "Personal",
                "email": "me@example.com",
                "imapHost": "imap.example.com",
                "imapPort": 993,
                "username": "me",
                "password": "hunter2",
            }),
        )
        .await;
    assert!(account.get("password").is_none());

    let (_, accounts) = app.admin(Method::GET, "/inbox/accounts", None).await;
    assert!(!accounts.to_string().contains("hunter2"));

    let id: Uuid = id_of(&account).parse().unwrap();
    assert_eq!(
        app.repo.email_account_password(id).await.as_deref(),
        Some("hunter2")
    );
    assert_eq!(app.repo.list_email_accounts().await.unwrap().len(), 1);
}

// --- Calendar ---

#[tokio::test]
async fn test_calendar_range_queries() {
    let app = spawn_app();
    app.create(
        "/calendar/events",
        json!({
            "title": "Standup",
            "startsAt": "2025-06-01T09:00:00Z",
            "endsAt": "2025-06-01T09:15:00Z",
        }),
    )
    .await;
    let later = app
        .create(
            "/calendar/events",
            json!({
                "title": "Trip",
                "startsAt": "2025-06-10T00:00:00Z",
                "endsAt": "2025-06-12T00:00:00Z",
                "allDay": true,
            }),
        )
        .await;

    let (status, events) = app
        .admin(
            Method::GET,
            "/calendar/events?from=2025-06-01T00:00:00Z&to=2025-06-02T00:00:00Z",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(len(&events), 1);
    assert_eq!(events[0]["title"], json!("Standup"));

    let (_, events) = app
        .admin(
            Method::GET,
            "/calendar/events?from=2025-06-11T00:00:00Z&to=2025-06-11T12:00:00Z",
            None,
        )
        .await;
    assert_eq!(len(&events), 1);
    assert_eq!(events[0]["title"], json!("Trip"));

    let (status, _) = app
        .admin(
            Method::GET,
            "/calendar/events?from=2025-06-02T00:00:00Z&to=2025-06-01T00:00:00Z",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .admin(
            Method::PUT,
            &format!("/calendar/events/{}", id_of(&later)),
            Some(json!({ "endsAt": "2025-06-09T00:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// --- Whiteboards ---

#[tokio::test]
async fn test_whiteboard_save_and_conflict() {
    let app = spawn_app();
    app.create("/whiteboards", json!({ "slug": "sketch", "name": "Sketch" }))
        .await;

    let (status, _) = app
        .admin(
            Method::POST,
            "/whiteboards",
            Some(json!({ "slug": "sketch", "name": "Again" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, saved) = app
        .admin(
            Method::PUT,
            "/whiteboards/sketch",
            Some(json!({ "elements": [{ "type": "line" }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["elements"], json!([{ "type": "line" }]));

    let (status, _) = app
        .admin(
            Method::PUT,
            "/whiteboards/sketch",
            Some(json!({ "elements": { "type": "line" } })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .admin(Method::GET, "/whiteboards/missing", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- API keys ---

#[tokio::test]
async fn test_api_key_plaintext_shown_once() {
    let app = spawn_app();
    let created = app
        .create("/api-keys", json!({ "name": "deploy bot" }))
        .await;

    let key = created["key"].as_str().unwrap();
    assert!(key.starts_with("sk_"));
    assert_eq!(key.len(), 51);
    assert_eq!(created["apiKey"]["prefix"], json!(&key[..8]));

    let (_, listed) = app.admin(Method::GET, "/api-keys", None).await;
    assert_eq!(len(&listed), 1);
    assert!(listed[0].get("key").is_none());
    assert!(!listed.to_string().contains(key));

    let id: Uuid = id_of(&created["apiKey"]).parse().unwrap();
    assert_eq!(app.repo.api_key_hash(id).await, Some(hash_key(key)));

    let (status, _) = app
        .admin(Method::DELETE, &format!("/api-keys/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app
        .admin(Method::DELETE, &format!("/api-keys/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
