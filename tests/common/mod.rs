#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use site_admin::{
    AppConfig, AppState, MemoryRepository, MockStorageService, RepositoryState, StorageState,
    auth::{ADMIN_ROLE, Claims},
    create_router,
};
use tower::ServiceExt;

pub const HEALTH_TOKEN: &str = "health-job-token";
pub const TODAY_TOKEN: &str = "today-job-token";

// --- Test Harness ---

/// A router wired to an in-memory repository the test can inspect directly.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub config: AppConfig,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        health_check_bearer_token: Some(HEALTH_TOKEN.to_string()),
        today_board_reset_job_token: Some(TODAY_TOKEN.to_string()),
        health_check_timeout: Duration::from_millis(300),
        ..AppConfig::default()
    }
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config(), MockStorageService::new())
}

pub fn spawn_app_with(config: AppConfig, storage: MockStorageService) -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::new(
        repo.clone() as RepositoryState,
        Arc::new(storage) as StorageState,
        config.clone(),
    );
    TestApp {
        router: create_router(state),
        repo,
        config,
    }
}

// --- Credentials ---

pub fn admin_token(config: &AppConfig) -> String {
    token_signed_with(&config.jwt_secret, &config.admin_email, ADMIN_ROLE)
}

pub fn token_signed_with(secret: &str, sub: &str, role: &str) -> String {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: sub.to_string(),
        role: role.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to sign test token")
}

// --- Requests ---

pub fn request(method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("failed to build request")
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    /// Sends a request carrying a valid admin session.
    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = admin_token(&self.config);
        self.send(request(method, uri, Some(&token), body)).await
    }

    /// Sends a request without any credentials.
    pub async fn anonymous(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(request(method, uri, None, body)).await
    }

    /// Sends a scheduler call with the given bearer token.
    pub async fn job(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    /// Creates an item through the admin API and returns its JSON body.
    pub async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, json) = self.admin(Method::POST, uri, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {uri} failed: {json}");
        json
    }
}

pub fn id_of(json: &Value) -> String {
    json["id"]
        .as_str()
        .expect("response has no id")
        .to_string()
}
