use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{deleted, found};
use crate::{
    AppState,
    auth::AdminSession,
    error::AppResult,
    extract::ValidJson,
    models::{
        BlogView, Comment, CreateCommentRequest, CreatePostRequest, ModerateCommentRequest, Post,
        UpdatePostRequest,
    },
};

// --- Public ---

/// list_published_posts
///
/// [Public Route] Published posts only, newest publication first.
#[utoipa::path(
    get,
    path = "/public/blog/posts",
    tag = "blog",
    responses((status = 200, description = "Published posts", body = [Post]))
)]
pub async fn list_published_posts(State(state): State<AppState>) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.repo.list_published_posts().await?))
}

#[utoipa::path(
    get,
    path = "/public/blog/posts/{slug}",
    tag = "blog",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "No published post with this slug")
    )
)]
pub async fn get_published_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Post>> {
    let post = state.repo.get_published_post(&slug).await?;
    Ok(Json(found(post, "post")?))
}

/// record_view
///
/// [Public Route] Counts one read of a published post and returns the new total.
#[utoipa::path(
    post,
    path = "/public/blog/posts/{slug}/views",
    tag = "blog",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Counter after the increment", body = BlogView),
        (status = 404, description = "No published post with this slug")
    )
)]
pub async fn record_view(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<BlogView>> {
    let view = state.repo.record_view(&slug).await?;
    Ok(Json(found(view, "post")?))
}

#[utoipa::path(
    get,
    path = "/public/blog/posts/{slug}/comments",
    tag = "blog",
    params(("slug" = String, Path, description = "Post slug")),
    responses((status = 200, description = "Approved comments, oldest first", body = [Comment]))
)]
pub async fn list_public_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<Comment>>> {
    let post = found(state.repo.get_published_post(&slug).await?, "post")?;
    Ok(Json(state.repo.list_approved_comments(post.id).await?))
}

/// submit_comment
///
/// [Public Route] Leaves a comment on a published post. It stays hidden until approved.
#[utoipa::path(
    post,
    path = "/public/blog/posts/{slug}/comments",
    tag = "blog",
    params(("slug" = String, Path, description = "Post slug")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment stored for moderation", body = Comment),
        (status = 400, description = "Invalid comment"),
        (status = 404, description = "No published post with this slug")
    )
)]
pub async fn submit_comment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ValidJson(payload): ValidJson<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    payload.validate()?;
    let post = found(state.repo.get_published_post(&slug).await?, "post")?;
    let comment = state.repo.add_comment(post.id, payload).await?;
    tracing::info!(post = %post.slug, comment = %comment.id, "comment awaiting moderation");
    Ok((StatusCode::CREATED, Json(comment)))
}

// --- Admin ---

#[utoipa::path(
    get,
    path = "/blog/posts",
    tag = "blog",
    responses((status = 200, description = "All posts including drafts", body = [Post]))
)]
pub async fn list_posts(State(state): State<AppState>) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.repo.list_posts().await?))
}

#[utoipa::path(
    get,
    path = "/blog/posts/{id}",
    tag = "blog",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses((status = 200, description = "Found", body = Post))
)]
pub async fn get_post(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Post>> {
    Ok(Json(found(state.repo.get_post(id).await?, "post")?))
}

#[utoipa::path(
    post,
    path = "/blog/posts",
    tag = "blog",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_post(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    payload.validate()?;
    let post = state.repo.create_post(payload).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// Partial update. Publishing a draft for the first time stamps `publishedAt`.
#[utoipa::path(
    put,
    path = "/blog/posts/{id}",
    tag = "blog",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn update_post(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    payload.validate()?;
    Ok(Json(found(state.repo.update_post(id, payload).await?, "post")?))
}

#[utoipa::path(
    delete,
    path = "/blog/posts/{id}",
    tag = "blog",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_post(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_post(id).await?, "post")
}

#[utoipa::path(
    get,
    path = "/blog/views",
    tag = "blog",
    responses((status = 200, description = "View counters, most viewed first", body = [BlogView]))
)]
pub async fn list_views(State(state): State<AppState>) -> AppResult<Json<Vec<BlogView>>> {
    Ok(Json(state.repo.list_views().await?))
}

#[utoipa::path(
    get,
    path = "/blog/comments",
    tag = "blog",
    responses((status = 200, description = "All comments, newest first", body = [Comment]))
)]
pub async fn list_comments(State(state): State<AppState>) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.repo.list_comments().await?))
}

#[utoipa::path(
    patch,
    path = "/blog/comments/{id}",
    tag = "blog",
    params(("id" = Uuid, Path, description = "Comment ID")),
    request_body = ModerateCommentRequest,
    responses((status = 200, description = "Moderated", body = Comment))
)]
pub async fn moderate_comment(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<ModerateCommentRequest>,
) -> AppResult<Json<Comment>> {
    let comment = state.repo.set_comment_approval(id, payload.approved).await?;
    Ok(Json(found(comment, "comment")?))
}

#[utoipa::path(
    delete,
    path = "/blog/comments/{id}",
    tag = "blog",
    params(("id" = Uuid, Path, description = "Comment ID")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_comment(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_comment(id).await?, "comment")
}
