//! Authentication handlers

use axum::{extract::State, Json};
use board_service::dto::{LoginRequest, LoginResponse};
use board_service::AuthService;

use crate::extractors::{ClientInfo, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Sign in with username and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.login(request, Some(client.ip().to_string())).await?;
    Ok(Json(response))
}
