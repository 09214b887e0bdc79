use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::deleted;
use crate::{
    AppState,
    auth::AdminSession,
    error::AppResult,
    extract::ValidJson,
    models::{ApiKey, CreateApiKeyRequest, CreatedApiKey},
};

const KEY_PREFIX: &str = "sk_";
const KEY_HEX_LEN: usize = 48;
const DISPLAY_PREFIX_LEN: usize = 8;

/// generate_key
///
/// `sk_` followed by 48 random hex characters, drawn from two v4 UUIDs.
pub fn generate_key() -> String {
    let random = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    format!("{KEY_PREFIX}{}", &random[..KEY_HEX_LEN])
}

/// Hex-encoded SHA-256 of the plaintext key; the only form that is stored.
pub fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

#[utoipa::path(
    get,
    path = "/api-keys",
    tag = "api-keys",
    responses((status = 200, description = "Issued keys, newest first", body = [ApiKey]))
)]
pub async fn list_api_keys(State(state): State<AppState>) -> AppResult<Json<Vec<ApiKey>>> {
    Ok(Json(state.repo.list_api_keys().await?))
}

/// create_api_key
///
/// Issues a new key. The response is the only place the plaintext ever appears.
#[utoipa::path(
    post,
    path = "/api-keys",
    tag = "api-keys",
    request_body = CreateApiKeyRequest,
    responses((status = 201, description = "Created", body = CreatedApiKey))
)]
pub async fn create_api_key(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateApiKeyRequest>,
) -> AppResult<(StatusCode, Json<CreatedApiKey>)> {
    payload.validate()?;
    let key = generate_key();
    let api_key = state
        .repo
        .create_api_key(&payload.name, &key[..DISPLAY_PREFIX_LEN], &hash_key(&key))
        .await?;
    tracing::info!(api_key = %api_key.id, prefix = %api_key.prefix, "api key issued");
    Ok((StatusCode::CREATED, Json(CreatedApiKey { api_key, key })))
}

#[utoipa::path(
    delete,
    path = "/api-keys/{id}",
    tag = "api-keys",
    params(("id" = Uuid, Path, description = "API key ID")),
    responses((status = 204, description = "Revoked"))
)]
pub async fn delete_api_key(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let status = deleted(state.repo.delete_api_key(id).await?, "api key")?;
    tracing::info!(api_key = %id, "api key revoked");
    Ok(status)
}
