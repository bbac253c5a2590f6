//! Ban handlers
//!
//! Everything except the caller's own ban lookup needs `MANAGE_BANS`.

use axum::{
    extract::{Path, State},
    Json,
};
use board_service::dto::{BanResponse, CreateBanRequest, UnbanRequest, UpdateBanRequest};
use board_service::BanService;

use crate::extractors::{AuthUser, BanPath, ClientInfo, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// GET /api/bans
pub async fn list_bans(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<BanResponse>>> {
    let service = BanService::new(state.service_context());
    Ok(Json(service.list(Some(&user)).await?))
}

/// Ban or warn an IP
///
/// POST /api/bans
pub async fn create_ban(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(request): ValidatedJson<CreateBanRequest>,
) -> ApiResult<Created<Json<BanResponse>>> {
    let service = BanService::new(state.service_context());
    Ok(Created(Json(service.create(request, Some(&user)).await?)))
}

/// The ban blocking the caller's address, 404 when there is none
///
/// GET /api/bans/current
pub async fn get_current_ban(
    State(state): State<AppState>,
    client: ClientInfo,
) -> ApiResult<Json<BanResponse>> {
    let service = BanService::new(state.service_context());
    Ok(Json(service.current(client.ip()).await?))
}

/// GET /api/bans/:id
pub async fn get_ban(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(path): Path<BanPath>,
) -> ApiResult<Json<BanResponse>> {
    let id = path.id()?;
    let service = BanService::new(state.service_context());
    Ok(Json(service.get(id, Some(&user)).await?))
}

/// Change reason and end
///
/// PUT /api/bans/:id
pub async fn update_ban(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(path): Path<BanPath>,
    ValidatedJson(request): ValidatedJson<UpdateBanRequest>,
) -> ApiResult<Json<BanResponse>> {
    let id = path.id()?;
    let service = BanService::new(state.service_context());
    Ok(Json(service.update(id, request, Some(&user)).await?))
}

/// PUT /api/bans/:id/unban
pub async fn unban(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(path): Path<BanPath>,
    ValidatedJson(request): ValidatedJson<UnbanRequest>,
) -> ApiResult<Json<BanResponse>> {
    let id = path.id()?;
    let service = BanService::new(state.service_context());
    Ok(Json(service.unban(id, request, Some(&user)).await?))
}
