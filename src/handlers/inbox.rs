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
        ContactFormRequest, CreateEmailAccountRequest, EmailAccount, InboxMessage,
        MarkReadRequest,
    },
};

/// submit_contact_form
///
/// [Public Route] The site's contact form. Messages land unread in the inbox.
#[utoipa::path(
    post,
    path = "/public/contact",
    tag = "inbox",
    request_body = ContactFormRequest,
    responses(
        (status = 201, description = "Message received", body = InboxMessage),
        (status = 400, description = "Invalid message")
    )
)]
pub async fn submit_contact_form(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ContactFormRequest>,
) -> AppResult<(StatusCode, Json<InboxMessage>)> {
    payload.validate()?;
    let message = state.repo.create_message(payload).await?;
    tracing::info!(message = %message.id, "contact form message received");
    Ok((StatusCode::CREATED, Json(message)))
}

#[utoipa::path(
    get,
    path = "/inbox/messages",
    tag = "inbox",
    responses((status = 200, description = "Newest first", body = [InboxMessage]))
)]
pub async fn list_messages(State(state): State<AppState>) -> AppResult<Json<Vec<InboxMessage>>> {
    Ok(Json(state.repo.list_messages().await?))
}

#[utoipa::path(
    patch,
    path = "/inbox/messages/{id}",
    tag = "inbox",
    params(("id" = Uuid, Path, description = "Message ID")),
    request_body = MarkReadRequest,
    responses((status = 200, description = "Updated", body = InboxMessage))
)]
pub async fn mark_message(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<MarkReadRequest>,
) -> AppResult<Json<InboxMessage>> {
    let message = state.repo.set_message_read(id, payload.read).await?;
    Ok(Json(found(message, "message")?))
}

#[utoipa::path(
    delete,
    path = "/inbox/messages/{id}",
    tag = "inbox",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_message(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_message(id).await?, "message")
}

// --- Email accounts ---

#[utoipa::path(
    get,
    path = "/inbox/accounts",
    tag = "inbox",
    responses((status = 200, description = "Configured accounts, without passwords", body = [EmailAccount]))
)]
pub async fn list_email_accounts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<EmailAccount>>> {
    Ok(Json(state.repo.list_email_accounts().await?))
}

/// create_email_account
///
/// Stores the account credentials. The password is accepted here and never
/// returned by any endpoint.
#[utoipa::path(
    post,
    path = "/inbox/accounts",
    tag = "inbox",
    request_body = CreateEmailAccountRequest,
    responses((status = 201, description = "Created", body = EmailAccount))
)]
pub async fn create_email_account(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateEmailAccountRequest>,
) -> AppResult<(StatusCode, Json<EmailAccount>)> {
    payload.validate()?;
    let account = state.repo.create_email_account(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[utoipa::path(
    delete,
    path = "/inbox/accounts/{id}",
    tag = "inbox",
    params(("id" = Uuid, Path, description = "Account ID")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_email_account(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_email_account(id).await?, "email account")
}
