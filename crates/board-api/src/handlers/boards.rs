//! Board handlers

use axum::{
    extract::{Path, State},
    Json,
};
use board_service::dto::{BoardResponse, CreateBoardRequest, UpdateBoardRequest};
use board_service::BoardService;

use crate::extractors::{AuthUser, JsonBody};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// GET /api/boards
pub async fn list_boards(State(state): State<AppState>) -> ApiResult<Json<Vec<BoardResponse>>> {
    let service = BoardService::new(state.service_context());
    Ok(Json(service.list().await?))
}

/// GET /api/boards/:label
pub async fn get_board(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> ApiResult<Json<BoardResponse>> {
    let service = BoardService::new(state.service_context());
    Ok(Json(service.get(&label).await?))
}

/// Create a board (`MANAGE_BOARDS`)
///
/// POST /api/boards
pub async fn create_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(request): JsonBody<CreateBoardRequest>,
) -> ApiResult<Created<Json<BoardResponse>>> {
    let service = BoardService::new(state.service_context());
    let response = service.create(request, Some(&user)).await?;
    Ok(Created(Json(response)))
}

/// PUT /api/boards/:label
pub async fn update_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(label): Path<String>,
    JsonBody(request): JsonBody<UpdateBoardRequest>,
) -> ApiResult<Json<BoardResponse>> {
    let service = BoardService::new(state.service_context());
    Ok(Json(service.update(&label, request, Some(&user)).await?))
}

/// Delete a board and everything posted to it
///
/// DELETE /api/boards/:label
pub async fn delete_board(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(label): Path<String>,
) -> ApiResult<NoContent> {
    let service = BoardService::new(state.service_context());
    service.delete(&label, Some(&user)).await?;
    Ok(NoContent)
}
