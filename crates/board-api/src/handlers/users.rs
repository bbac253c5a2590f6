//! User handlers
//!
//! Registration, the caller's own account, password reset, and account administration.

use axum::{
    extract::{Path, State},
    Json,
};
use board_service::dto::{
    CreateUserRequest, ForgotPasswordRequest, ResetPasswordRequest, UpdateCurrentUserRequest,
    UpdateUserRequest, UserResponse,
};
use board_service::{UserService, UserTokenService};

use crate::extractors::{AuthUser, ClientInfo, JsonBody, ValidatedJson};
use crate::response::{Accepted, ApiResult, Created, NoContent};
use crate::state::AppState;

/// Register an account
///
/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> ApiResult<Created<Json<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.create(request, Some(client.ip().to_string())).await?;
    Ok(Created(Json(response)))
}

/// List every account (`MANAGE_USERS`)
///
/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.list(Some(&user)).await?))
}

/// GET /api/users/current
pub async fn get_current_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Json<UserResponse> {
    Json(UserService::new(state.service_context()).current(&user))
}

/// Change the caller's email or password
///
/// PATCH /api/users/current
pub async fn update_current_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(request): ValidatedJson<UpdateCurrentUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.update_current(&user, request).await?))
}

/// Request a password reset token
///
/// POST /api/users/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ForgotPasswordRequest>,
) -> ApiResult<Accepted> {
    UserTokenService::new(state.service_context())
        .forgot_password(request)
        .await?;
    Ok(Accepted)
}

/// Set a new password with a reset token
///
/// POST /api/users/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<NoContent> {
    UserTokenService::new(state.service_context())
        .reset_password(request)
        .await?;
    Ok(NoContent)
}

/// GET /api/users/:username
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.get(&username, Some(&user)).await?))
}

/// Change another account's email, role, or enabled flag
///
/// PUT /api/users/:username
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let service = UserService::new(state.service_context());
    Ok(Json(service.update(&username, request, Some(&user)).await?))
}

/// DELETE /api/users/:username
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> ApiResult<NoContent> {
    let service = UserService::new(state.service_context());
    service.delete(&username, Some(&user)).await?;
    Ok(NoContent)
}
