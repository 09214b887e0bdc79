use crate::{
    AppState,
    handlers::{blog, inbox, timeline},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. Reads only ever expose published posts,
/// approved comments and the timeline; the only writes are reader submissions
/// (view counts, comments held for moderation, contact form messages).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        .route("/public/blog/posts", get(blog::list_published_posts))
        .route("/public/blog/posts/{slug}", get(blog::get_published_post))
        .route("/public/blog/posts/{slug}/views", post(blog::record_view))
        .route(
            "/public/blog/posts/{slug}/comments",
            get(blog::list_public_comments).post(blog::submit_comment),
        )
        // GET /public/timeline
        // Served from the listing cache.
        .route("/public/timeline", get(timeline::public_timeline))
        .route("/public/contact", post(inbox::submit_contact_form))
}
