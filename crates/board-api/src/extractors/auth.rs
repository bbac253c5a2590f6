//! Authentication extractor
//!
//! Resolves the bearer token in the Authorization header to the stored user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use board_core::User;
use board_service::AuthService;

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated user
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

async fn resolve(bearer: &Bearer, state: &AppState) -> Result<User, ApiError> {
    AuthService::new(state.service_context())
        .authenticate(bearer.token())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Rejected bearer token");
            ApiError::from(e)
        })
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        resolve(&bearer, &app_state).await.map(AuthUser)
    }
}

/// Optional authenticated user
///
/// `None` when no Authorization header is sent; an invalid token is still an error.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<User>);

impl OptionalAuthUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalAuthUser(None));
        }
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        Ok(OptionalAuthUser(Some(user)))
    }
}
