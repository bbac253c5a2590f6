//! Post handlers

use axum::extract::{Path, State};
use board_service::dto::DeletePostRequest;
use board_service::BoardPostingService;

use crate::extractors::{BoardPostPath, OptionalAuthUser, OptionalValidatedJson};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Delete a post with its deletion code, or as staff with `DELETE_POST`.
/// Deleting an opening post removes the whole thread.
///
/// DELETE /api/boards/:label/posts/:number
pub async fn delete_post(
    State(state): State<AppState>,
    actor: OptionalAuthUser,
    Path(path): Path<BoardPostPath>,
    OptionalValidatedJson(request): OptionalValidatedJson<DeletePostRequest>,
) -> ApiResult<NoContent> {
    let number = path.number()?;
    let deletion_code = request.and_then(|r| r.deletion_code);

    let service = BoardPostingService::new(state.service_context());
    service
        .delete_post(&path.label, number, deletion_code.as_deref(), actor.user())
        .await?;
    Ok(NoContent)
}
