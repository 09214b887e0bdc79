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
    models::{Contact, ContactRequest},
};

#[utoipa::path(
    get,
    path = "/contacts",
    tag = "contacts",
    responses((status = 200, description = "Contacts by name", body = [Contact]))
)]
pub async fn list_contacts(State(state): State<AppState>) -> AppResult<Json<Vec<Contact>>> {
    Ok(Json(state.repo.list_contacts().await?))
}

#[utoipa::path(
    get,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses((status = 200, description = "Found", body = Contact))
)]
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Contact>> {
    Ok(Json(found(state.repo.get_contact(id).await?, "contact")?))
}

#[utoipa::path(
    post,
    path = "/contacts",
    tag = "contacts",
    request_body = ContactRequest,
    responses((status = 201, description = "Created", body = Contact))
)]
pub async fn create_contact(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ContactRequest>,
) -> AppResult<(StatusCode, Json<Contact>)> {
    payload.validate()?;
    let contact = state.repo.create_contact(payload).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// update_contact
///
/// Full replacement of the editable fields.
#[utoipa::path(
    put,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = Uuid, Path, description = "Contact ID")),
    request_body = ContactRequest,
    responses((status = 200, description = "Updated", body = Contact))
)]
pub async fn update_contact(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<ContactRequest>,
) -> AppResult<Json<Contact>> {
    payload.validate()?;
    Ok(Json(found(state.repo.update_contact(id, payload).await?, "contact")?))
}

#[utoipa::path(
    delete,
    path = "/contacts/{id}",
    tag = "contacts",
    params(("id" = Uuid, Path, description = "Contact ID")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_contact(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_contact(id).await?, "contact")
}
