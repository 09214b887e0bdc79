use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{deleted, found};
use crate::{
    AppState,
    auth::AdminSession,
    error::AppResult,
    extract::ValidJson,
    models::{CreateNoteRequest, Folder, FolderRequest, Note, NoteFilter, UpdateNoteRequest},
};

// --- Folders ---

#[utoipa::path(
    get,
    path = "/notes/folders",
    tag = "notes",
    responses((status = 200, description = "Folders by name", body = [Folder]))
)]
pub async fn list_folders(State(state): State<AppState>) -> AppResult<Json<Vec<Folder>>> {
    Ok(Json(state.repo.list_folders().await?))
}

#[utoipa::path(
    post,
    path = "/notes/folders",
    tag = "notes",
    request_body = FolderRequest,
    responses((status = 201, description = "Created", body = Folder))
)]
pub async fn create_folder(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<FolderRequest>,
) -> AppResult<(StatusCode, Json<Folder>)> {
    payload.validate()?;
    let folder = state.repo.create_folder(payload).await?;
    Ok((StatusCode::CREATED, Json(folder)))
}

#[utoipa::path(
    put,
    path = "/notes/folders/{id}",
    tag = "notes",
    params(("id" = Uuid, Path, description = "Folder ID")),
    request_body = FolderRequest,
    responses((status = 200, description = "Renamed", body = Folder))
)]
pub async fn rename_folder(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<FolderRequest>,
) -> AppResult<Json<Folder>> {
    payload.validate()?;
    Ok(Json(found(state.repo.rename_folder(id, payload).await?, "folder")?))
}

/// delete_folder
///
/// Notes stored in the folder are kept and moved to the root.
#[utoipa::path(
    delete,
    path = "/notes/folders/{id}",
    tag = "notes",
    params(("id" = Uuid, Path, description = "Folder ID")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_folder(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_folder(id).await?, "folder")
}

// --- Notes ---

#[utoipa::path(
    get,
    path = "/notes",
    tag = "notes",
    params(NoteFilter),
    responses((status = 200, description = "Pinned first, then most recently updated", body = [Note]))
)]
pub async fn list_notes(
    State(state): State<AppState>,
    Query(filter): Query<NoteFilter>,
) -> AppResult<Json<Vec<Note>>> {
    Ok(Json(state.repo.list_notes(filter.folder_id).await?))
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    tag = "notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses((status = 200, description = "Found", body = Note))
)]
pub async fn get_note(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<Note>> {
    Ok(Json(found(state.repo.get_note(id).await?, "note")?))
}

#[utoipa::path(
    post,
    path = "/notes",
    tag = "notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Created", body = Note),
        (status = 404, description = "Folder not found")
    )
)]
pub async fn create_note(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateNoteRequest>,
) -> AppResult<(StatusCode, Json<Note>)> {
    payload.validate()?;
    let note = state.repo.create_note(payload).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// update_note
///
/// `"folderId": null` moves the note to the root; omitting it keeps the folder.
#[utoipa::path(
    put,
    path = "/notes/{id}",
    tag = "notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses((status = 200, description = "Updated", body = Note))
)]
pub async fn update_note(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdateNoteRequest>,
) -> AppResult<Json<Note>> {
    payload.validate()?;
    Ok(Json(found(state.repo.update_note(id, payload).await?, "note")?))
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    tag = "notes",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_note(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_note(id).await?, "note")
}
