//! Thread handlers
//!
//! Board pages, single threads, reply polling, posting, and the moderator toggles.

use axum::{
    extract::{Path, State},
    Json,
};
use board_service::dto::{
    PostCreatedResponse, PostResponse, ThreadPageResponse, ThreadResponse, ThreadSummaryResponse,
    ToggleRequest,
};
use board_service::BoardPostingService;

use crate::extractors::{
    AuthUser, BoardThreadPath, ClientInfo, OptionalAuthUser, PageQuery, PostingForm, SinceQuery,
    ValidatedJson,
};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// One page of threads, stickies first
///
/// GET /api/boards/:label/threads?page=N
pub async fn list_threads(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(label): Path<String>,
    query: PageQuery,
) -> ApiResult<Json<ThreadPageResponse>> {
    let service = BoardPostingService::new(state.service_context());
    let response = service.list_threads(&label, query.page, viewer.user()).await?;
    Ok(Json(response))
}

/// Start a thread
///
/// POST /api/boards/:label/threads (multipart)
pub async fn create_thread(
    State(state): State<AppState>,
    author: OptionalAuthUser,
    ClientInfo(poster): ClientInfo,
    Path(label): Path<String>,
    form: PostingForm,
) -> ApiResult<Created<Json<PostCreatedResponse>>> {
    let service = BoardPostingService::new(state.service_context());
    let response = service
        .create_thread(&label, form.into_thread_form(), &poster, author.user())
        .await?;
    Ok(Created(Json(response)))
}

/// GET /api/boards/:label/threads/:number
pub async fn get_thread(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(path): Path<BoardThreadPath>,
) -> ApiResult<Json<ThreadResponse>> {
    let number = path.number()?;
    let service = BoardPostingService::new(state.service_context());
    Ok(Json(service.get_thread(&path.label, number, viewer.user()).await?))
}

/// Replies numbered above `since`
///
/// GET /api/boards/:label/threads/:number/replies?since=N
pub async fn list_replies(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(path): Path<BoardThreadPath>,
    query: SinceQuery,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let number = path.number()?;
    let service = BoardPostingService::new(state.service_context());
    let replies = service
        .replies_since(&path.label, number, query.since, viewer.user())
        .await?;
    Ok(Json(replies))
}

/// Reply to a thread
///
/// POST /api/boards/:label/threads/:number/replies (multipart)
pub async fn create_reply(
    State(state): State<AppState>,
    author: OptionalAuthUser,
    ClientInfo(poster): ClientInfo,
    Path(path): Path<BoardThreadPath>,
    form: PostingForm,
) -> ApiResult<Created<Json<PostCreatedResponse>>> {
    let number = path.number()?;
    let service = BoardPostingService::new(state.service_context());
    let response = service
        .create_reply(&path.label, number, form.into_post_form(), &poster, author.user())
        .await?;
    Ok(Created(Json(response)))
}

/// PATCH /api/boards/:label/threads/:number/lock
pub async fn set_locked(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(path): Path<BoardThreadPath>,
    ValidatedJson(request): ValidatedJson<ToggleRequest>,
) -> ApiResult<Json<ThreadSummaryResponse>> {
    let number = path.number()?;
    let service = BoardPostingService::new(state.service_context());
    let response = service
        .set_locked(&path.label, number, request.value, Some(&user))
        .await?;
    Ok(Json(response))
}

/// PATCH /api/boards/:label/threads/:number/sticky
pub async fn set_stickied(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(path): Path<BoardThreadPath>,
    ValidatedJson(request): ValidatedJson<ToggleRequest>,
) -> ApiResult<Json<ThreadSummaryResponse>> {
    let number = path.number()?;
    let service = BoardPostingService::new(state.service_context());
    let response = service
        .set_stickied(&path.label, number, request.value, Some(&user))
        .await?;
    Ok(Json(response))
}
