use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod health;
pub mod models;
pub mod reorder;
pub mod repository;
pub mod storage;

// Routing segregation (Public, Admin, Jobs).
pub mod routes;
use routes::{admin, jobs, public};

// --- Public Re-exports ---

pub use cache::ListingCache;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use health::HealthChecker;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

use handlers::{
    api_keys, blog, calendar, contacts, inbox, jobs as job_handlers, kanban, notes, resources,
    timeline, uploads, whiteboards,
};

/// ApiDoc
///
/// Generated OpenAPI document for every route, served at `/api-docs/openapi.json`
/// and browsable through the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        blog::list_published_posts, blog::get_published_post, blog::record_view,
        blog::list_public_comments, blog::submit_comment, blog::list_posts, blog::get_post,
        blog::create_post, blog::update_post, blog::delete_post, blog::list_views,
        blog::list_comments, blog::moderate_comment, blog::delete_comment,
        kanban::list_boards, kanban::get_board, kanban::create_board, kanban::update_board,
        kanban::delete_board, kanban::create_column, kanban::update_column,
        kanban::delete_column, kanban::reorder_columns, kanban::create_card,
        kanban::update_card, kanban::delete_card, kanban::reorder_cards,
        timeline::public_timeline, timeline::list_timeline, timeline::create_timeline_item,
        timeline::update_timeline_item, timeline::delete_timeline_item,
        timeline::reorder_timeline,
        notes::list_folders, notes::create_folder, notes::rename_folder, notes::delete_folder,
        notes::list_notes, notes::get_note, notes::create_note, notes::update_note,
        notes::delete_note,
        contacts::list_contacts, contacts::get_contact, contacts::create_contact,
        contacts::update_contact, contacts::delete_contact,
        inbox::submit_contact_form, inbox::list_messages, inbox::mark_message,
        inbox::delete_message, inbox::list_email_accounts, inbox::create_email_account,
        inbox::delete_email_account,
        calendar::list_events, calendar::get_event, calendar::create_event,
        calendar::update_event, calendar::delete_event,
        whiteboards::list_whiteboards, whiteboards::get_whiteboard,
        whiteboards::create_whiteboard, whiteboards::save_whiteboard,
        whiteboards::delete_whiteboard,
        api_keys::list_api_keys, api_keys::create_api_key, api_keys::delete_api_key,
        resources::list_resources, resources::create_resource, resources::delete_resource,
        resources::list_resource_logs, resources::run_health_check,
        job_handlers::health_check_job, job_handlers::today_board_job,
        uploads::get_presigned_url,
    ),
    components(
        schemas(
            models::Post, models::BlogView, models::Comment, models::CreatePostRequest,
            models::UpdatePostRequest, models::CreateCommentRequest,
            models::ModerateCommentRequest,
            models::Board, models::Column, models::Card, models::BoardDetail,
            models::BoardRequest, models::ColumnRequest, models::CreateCardRequest,
            models::UpdateCardRequest,
            models::TimelineItem, models::CreateTimelineItemRequest,
            models::UpdateTimelineItemRequest,
            reorder::ReorderItem, reorder::ReorderRequest, models::SuccessResponse,
            models::Folder, models::Note, models::FolderRequest, models::CreateNoteRequest,
            models::UpdateNoteRequest,
            models::Contact, models::ContactRequest,
            models::InboxMessage, models::EmailAccount, models::ContactFormRequest,
            models::MarkReadRequest, models::CreateEmailAccountRequest,
            models::Event, models::CreateEventRequest, models::UpdateEventRequest,
            models::Whiteboard, models::CreateWhiteboardRequest, models::SaveWhiteboardRequest,
            models::ClearOutcome, models::TodayBoardResult, models::TodayBoardResponse,
            models::ApiKey, models::CreateApiKeyRequest, models::CreatedApiKey,
            models::Resource, models::CreateResourceRequest, models::HealthCheckLog,
            models::HealthCheckSweepResponse,
            models::PresignedUrlRequest, models::PresignedUrlResponse,
        )
    ),
    tags(
        (name = "site-admin", description = "Personal site admin dashboard API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single shared container of services and configuration, cloned per request.
#[derive(Clone)]
pub struct AppState {
    /// Data access (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// Object storage for presigned media uploads.
    pub storage: StorageState,
    pub config: AppConfig,
    /// HTTP prober used by both health-check entry points.
    pub checker: HealthChecker,
    /// Cached public timeline; dropped by every timeline mutation.
    pub timeline_cache: Arc<ListingCache<models::TimelineItem>>,
}

impl AppState {
    /// Wires the derived services (prober, caches) around the injected dependencies.
    pub fn new(repo: RepositoryState, storage: StorageState, config: AppConfig) -> Self {
        Self {
            repo,
            storage,
            checker: HealthChecker::new(config.health_check_timeout),
            config,
            timeline_cache: Arc::new(ListingCache::new("timeline")),
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the admin guard and the observability
/// layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(jobs::job_routes())
        // Admin routes: the session guard runs before any extractor of the handler,
        // so unauthenticated requests are rejected before their body is parsed.
        .merge(
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_admin,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, URI and the request id, so every log line of
/// one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
