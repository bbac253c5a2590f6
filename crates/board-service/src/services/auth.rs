//! Authentication service
//!
//! Staff sign in with username and password and receive a bearer token. Every
//! authenticated request resolves that token back to the stored user.

use board_common::AppError;
use board_core::User;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{LoginRequest, LoginResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Login with username and password
    #[instrument(skip(self, request, ip), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest, ip: Option<String>) -> ServiceResult<LoginResponse> {
        request.validate()?;

        let mut user = self
            .ctx
            .user_repo()
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: user not found");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        let password_hash = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %user.id, "Login failed: no password hash");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if let Err(e) = self
            .ctx
            .password_service()
            .verify_or_error(&request.password, &password_hash)
            .await
        {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(e.into());
        }

        if !user.enabled {
            warn!(user_id = %user.id, "Login failed: account disabled");
            return Err(AppError::AccountDisabled.into());
        }

        user.record_login(ip);
        self.ctx.user_repo().update(&user).await?;

        let token = self.ctx.jwt_service().issue(user.id, &user.username)?;
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            user: UserResponse::from(user),
        })
    }

    /// Resolve a bearer token to the user it was issued for
    pub async fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let claims = self.ctx.jwt_service().validate(token)?;
        let user_id = claims.user_id()?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        if !user.enabled {
            return Err(AppError::AccountDisabled.into());
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Harness;
    use board_core::UserRole;

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let h = Harness::new();
        h.user("mod", UserRole::Moderator).await;
        let service = AuthService::new(&h.ctx);

        let response = service
            .login(login("mod", "correct horse battery"), Some("198.51.100.4".to_string()))
            .await
            .unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.user.username, "mod");
        assert!(response.user.last_login_at.is_some());

        let user = service.authenticate(&response.access_token).await.unwrap();
        assert_eq!(user.username, "mod");
        assert_eq!(user.last_login_ip.as_deref(), Some("198.51.100.4"));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let h = Harness::new();
        h.user("mod", UserRole::Moderator).await;
        let service = AuthService::new(&h.ctx);

        let err = service.login(login("mod", "wrong password"), None).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");
        let err = service.login(login("nobody", "whatever"), None).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CREDENTIALS");
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn test_disabled_account() {
        let h = Harness::new();
        let mut user = h.user("mod", UserRole::Moderator).await;
        let service = AuthService::new(&h.ctx);
        let token = service
            .login(login("mod", "correct horse battery"), None)
            .await
            .unwrap()
            .access_token;

        user.enabled = false;
        h.ctx.user_repo().update(&user).await.unwrap();

        let err = service.login(login("mod", "correct horse battery"), None).await.unwrap_err();
        assert_eq!(err.error_code(), "ACCOUNT_DISABLED");
        let err = service.authenticate(&token).await.unwrap_err();
        assert_eq!(err.error_code(), "ACCOUNT_DISABLED");
    }

    #[tokio::test]
    async fn test_garbage_token() {
        let h = Harness::new();
        let err = AuthService::new(&h.ctx).authenticate("not-a-jwt").await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
