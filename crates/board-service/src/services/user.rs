//! User service
//!
//! Account registration, self-service profile changes, and account administration
//! (`MANAGE_USERS`).

use board_core::{Authorities, DomainError, User};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{CreateUserRequest, UpdateCurrentUserRequest, UpdateUserRequest, UserResponse};

use super::access::require_authority;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new account with the `USER` role
    #[instrument(skip(self, request, ip), fields(username = %request.username))]
    pub async fn create(
        &self,
        request: CreateUserRequest,
        ip: Option<String>,
    ) -> ServiceResult<UserResponse> {
        request.validate()?;

        let password_hash = self.ctx.password_service().hash(&request.password).await?;
        let mut user = User::new(self.ctx.generate_id(), request.username, request.email);
        user.registration_ip = ip;
        self.ctx.user_repo().create(&user, &password_hash).await?;

        info!(user_id = %user.id, "User registered");
        Ok(UserResponse::from(user))
    }

    pub async fn list(&self, actor: Option<&User>) -> ServiceResult<Vec<UserResponse>> {
        require_authority(actor, Authorities::MANAGE_USERS)?;
        let users = self.ctx.user_repo().find_all().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get(&self, username: &str, actor: Option<&User>) -> ServiceResult<UserResponse> {
        require_authority(actor, Authorities::MANAGE_USERS)?;
        self.find(username).await.map(UserResponse::from)
    }

    /// Administrative edit of email, role, or enabled flag
    #[instrument(skip(self, request, actor))]
    pub async fn update(
        &self,
        username: &str,
        request: UpdateUserRequest,
        actor: Option<&User>,
    ) -> ServiceResult<UserResponse> {
        let admin = require_authority(actor, Authorities::MANAGE_USERS)?;
        request.validate()?;

        let mut user = self.find(username).await?;
        if let Some(email) = request.email {
            user.set_email(email);
        }
        if let Some(role) = request.role {
            user.set_role(role);
        }
        if let Some(enabled) = request.enabled {
            user.enabled = enabled;
        }
        self.ctx.user_repo().update(&user).await?;

        info!(
            user_id = %user.id,
            admin = %admin.username,
            role = %user.role.as_str(),
            enabled = user.enabled,
            "User updated"
        );
        Ok(UserResponse::from(user))
    }

    /// Delete an account and every token issued to it
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, username: &str, actor: Option<&User>) -> ServiceResult<()> {
        let admin = require_authority(actor, Authorities::MANAGE_USERS)?;
        let user = self.find(username).await?;

        let tokens = self.ctx.token_repo().delete_by_user(user.id).await?;
        self.ctx.user_repo().delete(user.id).await?;

        info!(user_id = %user.id, admin = %admin.username, tokens, "User deleted");
        Ok(())
    }

    pub fn current(&self, user: &User) -> UserResponse {
        UserResponse::from(user)
    }

    /// Change the caller's own email or password. A new password needs the current one.
    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn update_current(
        &self,
        user: &User,
        request: UpdateCurrentUserRequest,
    ) -> ServiceResult<UserResponse> {
        request.validate()?;

        if let Some(password) = &request.password {
            let Some(current) = request.current_password.as_deref() else {
                return Err(ServiceError::invalid_field(
                    "current_password",
                    "required",
                    "Current password is required to set a new password",
                ));
            };
            let hash = self
                .ctx
                .user_repo()
                .get_password_hash(user.id)
                .await?
                .ok_or_else(|| DomainError::UserNotFound(user.username.clone()))?;
            if !self.ctx.password_service().verify(current, &hash).await? {
                return Err(ServiceError::invalid_field(
                    "current_password",
                    "mismatch",
                    "Current password is incorrect",
                ));
            }

            let new_hash = self.ctx.password_service().hash(password).await?;
            self.ctx.user_repo().update_password(user.id, &new_hash).await?;
            info!("Password changed");
        }

        let mut updated = user.clone();
        if let Some(email) = request.email {
            updated.set_email(email);
            self.ctx.user_repo().update(&updated).await?;
            info!("Email changed");
        }

        Ok(UserResponse::from(updated))
    }

    async fn find(&self, username: &str) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::UserNotFound(username.to_string()).into())
    }
}
