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
        Board, BoardDetail, BoardRequest, Card, Column, ColumnRequest, CreateCardRequest,
        SuccessResponse, UpdateCardRequest,
    },
    reorder::{self, ReorderRequest, ReorderScope},
};

#[utoipa::path(
    get,
    path = "/kanban/boards",
    tag = "kanban",
    responses((status = 200, description = "Boards", body = [Board]))
)]
pub async fn list_boards(State(state): State<AppState>) -> AppResult<Json<Vec<Board>>> {
    Ok(Json(state.repo.list_boards().await?))
}

/// get_board
///
/// The board with its columns and cards, each already sorted by `order`.
#[utoipa::path(
    get,
    path = "/kanban/boards/{board_id}",
    tag = "kanban",
    params(("board_id" = Uuid, Path, description = "Board ID")),
    responses(
        (status = 200, description = "Board detail", body = BoardDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_board(
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> AppResult<Json<BoardDetail>> {
    Ok(Json(found(state.repo.get_board_detail(board_id).await?, "board")?))
}

#[utoipa::path(
    post,
    path = "/kanban/boards",
    tag = "kanban",
    request_body = BoardRequest,
    responses((status = 201, description = "Created", body = Board))
)]
pub async fn create_board(
    _admin: AdminSession,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<BoardRequest>,
) -> AppResult<(StatusCode, Json<Board>)> {
    payload.validate()?;
    let board = state.repo.create_board(payload).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

#[utoipa::path(
    put,
    path = "/kanban/boards/{board_id}",
    tag = "kanban",
    params(("board_id" = Uuid, Path, description = "Board ID")),
    request_body = BoardRequest,
    responses((status = 200, description = "Updated", body = Board))
)]
pub async fn update_board(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    ValidJson(payload): ValidJson<BoardRequest>,
) -> AppResult<Json<Board>> {
    payload.validate()?;
    Ok(Json(found(state.repo.update_board(board_id, payload).await?, "board")?))
}

/// delete_board
///
/// Removes the board together with its columns and cards.
#[utoipa::path(
    delete,
    path = "/kanban/boards/{board_id}",
    tag = "kanban",
    params(("board_id" = Uuid, Path, description = "Board ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete_board(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_board(board_id).await?, "board")
}

// --- Columns ---

#[utoipa::path(
    post,
    path = "/kanban/boards/{board_id}/columns",
    tag = "kanban",
    params(("board_id" = Uuid, Path, description = "Board ID")),
    request_body = ColumnRequest,
    responses(
        (status = 201, description = "Appended after the last column", body = Column),
        (status = 404, description = "Board not found")
    )
)]
pub async fn create_column(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    ValidJson(payload): ValidJson<ColumnRequest>,
) -> AppResult<(StatusCode, Json<Column>)> {
    payload.validate()?;
    let column = state.repo.create_column(board_id, payload).await?;
    Ok((StatusCode::CREATED, Json(column)))
}

#[utoipa::path(
    put,
    path = "/kanban/boards/{board_id}/columns/{column_id}",
    tag = "kanban",
    params(
        ("board_id" = Uuid, Path, description = "Board ID"),
        ("column_id" = Uuid, Path, description = "Column ID")
    ),
    request_body = ColumnRequest,
    responses((status = 200, description = "Renamed", body = Column))
)]
pub async fn update_column(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((board_id, column_id)): Path<(Uuid, Uuid)>,
    ValidJson(payload): ValidJson<ColumnRequest>,
) -> AppResult<Json<Column>> {
    payload.validate()?;
    let column = state.repo.update_column(board_id, column_id, payload).await?;
    Ok(Json(found(column, "column")?))
}

#[utoipa::path(
    delete,
    path = "/kanban/boards/{board_id}/columns/{column_id}",
    tag = "kanban",
    params(
        ("board_id" = Uuid, Path, description = "Board ID"),
        ("column_id" = Uuid, Path, description = "Column ID")
    ),
    responses((status = 204, description = "Deleted with its cards"))
)]
pub async fn delete_column(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((board_id, column_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_column(board_id, column_id).await?, "column")
}

/// reorder_columns
///
/// Persists the column positions produced by a drag-and-drop. Ids that are not
/// columns of this board are ignored.
#[utoipa::path(
    patch,
    path = "/kanban/boards/{board_id}/columns/reorder",
    tag = "kanban",
    params(("board_id" = Uuid, Path, description = "Board ID")),
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Applied", body = SuccessResponse),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "No admin session")
    )
)]
pub async fn reorder_columns(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    ValidJson(payload): ValidJson<ReorderRequest>,
) -> AppResult<Json<SuccessResponse>> {
    reorder::apply(state.repo.as_ref(), ReorderScope::Columns { board_id }, &payload).await?;
    Ok(Json(SuccessResponse::ok()))
}

// --- Cards ---

#[utoipa::path(
    post,
    path = "/kanban/boards/{board_id}/cards",
    tag = "kanban",
    params(("board_id" = Uuid, Path, description = "Board ID")),
    request_body = CreateCardRequest,
    responses(
        (status = 201, description = "Appended at the end of its column", body = Card),
        (status = 404, description = "Column not on this board")
    )
)]
pub async fn create_card(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    ValidJson(payload): ValidJson<CreateCardRequest>,
) -> AppResult<(StatusCode, Json<Card>)> {
    payload.validate()?;
    let card = state.repo.create_card(board_id, payload).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

#[utoipa::path(
    put,
    path = "/kanban/boards/{board_id}/cards/{card_id}",
    tag = "kanban",
    params(
        ("board_id" = Uuid, Path, description = "Board ID"),
        ("card_id" = Uuid, Path, description = "Card ID")
    ),
    request_body = UpdateCardRequest,
    responses((status = 200, description = "Updated", body = Card))
)]
pub async fn update_card(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(Uuid, Uuid)>,
    ValidJson(payload): ValidJson<UpdateCardRequest>,
) -> AppResult<Json<Card>> {
    payload.validate()?;
    let card = state.repo.update_card(board_id, card_id, payload).await?;
    Ok(Json(found(card, "card")?))
}

#[utoipa::path(
    delete,
    path = "/kanban/boards/{board_id}/cards/{card_id}",
    tag = "kanban",
    params(
        ("board_id" = Uuid, Path, description = "Board ID"),
        ("card_id" = Uuid, Path, description = "Card ID")
    ),
    responses((status = 204, description = "Deleted"))
)]
pub async fn delete_card(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    deleted(state.repo.delete_card(board_id, card_id).await?, "card")
}

/// reorder_cards
///
/// Like `reorder_columns`, but an item may also carry `columnId` to move the card
/// into another column of the same board within the same batch.
#[utoipa::path(
    patch,
    path = "/kanban/boards/{board_id}/cards/reorder",
    tag = "kanban",
    params(("board_id" = Uuid, Path, description = "Board ID")),
    request_body = ReorderRequest,
    responses(
        (status = 200, description = "Applied", body = SuccessResponse),
        (status = 400, description = "Malformed payload"),
        (status = 401, description = "No admin session")
    )
)]
pub async fn reorder_cards(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(board_id): Path<Uuid>,
    ValidJson(payload): ValidJson<ReorderRequest>,
) -> AppResult<Json<SuccessResponse>> {
    reorder::apply(state.repo.as_ref(), ReorderScope::Cards { board_id }, &payload).await?;
    Ok(Json(SuccessResponse::ok()))
}
