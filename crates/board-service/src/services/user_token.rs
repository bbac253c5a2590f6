//! User token service
//!
//! Password reset tokens: issued on request, consumed once, and purged in bulk after
//! they expire. Consuming is a single conditional delete, so a purge sweep or a second
//! reset attempt racing with a reset can never both succeed.

use std::sync::Arc;
use std::time::Duration;

use board_core::constants::USER_TOKEN_LENGTH;
use board_core::{DomainError, UserToken, UserTokenRepository, UserTokenType};
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::dto::{ForgotPasswordRequest, ResetPasswordRequest};

use super::context::ServiceContext;
use super::error::{field_error, ServiceError, ServiceResult};
use super::identity::random_alphanumeric;

pub struct UserTokenService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserTokenService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a password reset token, replacing any earlier one for the same user.
    ///
    /// Delivering the token by email is left to the deployment; the token is returned
    /// and only ever logged at debug level.
    #[instrument(skip(self, request))]
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> ServiceResult<UserToken> {
        let mut errors = request.validate().err().unwrap_or_default();
        let captcha = request.captcha_token.as_deref().unwrap_or_default();
        if !self
            .ctx
            .captcha_verifier()
            .verify_captcha_token(captcha)
            .await
            .is_valid()
        {
            errors.add(
                "captcha",
                field_error("captcha_rejected", "Captcha verification failed"),
            );
        }
        if !errors.is_empty() {
            return Err(ServiceError::InvalidFields(errors));
        }

        let identity = request.username_or_email.trim();
        let user = match self.ctx.user_repo().find_by_username(identity).await? {
            Some(user) => user,
            None => self
                .ctx
                .user_repo()
                .find_by_email(identity)
                .await?
                .ok_or_else(|| DomainError::UserNotFound(identity.to_string()))?,
        };

        let token = UserToken::new(
            random_alphanumeric(USER_TOKEN_LENGTH),
            user.id,
            UserTokenType::PasswordReset,
            self.ctx.password_reset_ttl(),
        );
        self.ctx.token_repo().issue(&token).await?;

        info!(user_id = %user.id, expires_at = %token.expiration_at, "Password reset token issued");
        debug!(user_id = %user.id, token = %token.value, "Password reset token value");
        Ok(token)
    }

    /// Consume a reset token and set the new password
    #[instrument(skip(self, request))]
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ServiceResult<()> {
        request.validate()?;

        let token = self
            .ctx
            .token_repo()
            .find_by_value_and_type(&request.token, UserTokenType::PasswordReset)
            .await?
            .ok_or(DomainError::TokenNotFound)?;
        if token.is_expired(Utc::now()) {
            return Err(DomainError::TokenExpired.into());
        }

        let consumed = self
            .ctx
            .token_repo()
            .consume(token.user_id, &token.value, token.token_type)
            .await?;
        if !consumed {
            return Err(DomainError::TokenNotFound.into());
        }

        let hash = self.ctx.password_service().hash(&request.password).await?;
        self.ctx.user_repo().update_password(token.user_id, &hash).await?;

        info!(user_id = %token.user_id, "Password reset");
        Ok(())
    }

    /// Delete every token that expired before `now`
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> ServiceResult<u64> {
        Ok(purge(self.ctx.token_repo(), now).await?)
    }
}

async fn purge(repo: &dyn UserTokenRepository, now: DateTime<Utc>) -> Result<u64, DomainError> {
    let purged = repo.delete_expired(now).await?;
    if purged > 0 {
        info!(purged, "Expired user tokens purged");
    } else {
        debug!("No expired user tokens");
    }
    Ok(purged)
}

/// Background sweep deleting expired tokens on a fixed interval
pub struct TokenPurgeTask {
    repo: Arc<dyn UserTokenRepository>,
    period: Duration,
}

impl TokenPurgeTask {
    pub fn new(repo: Arc<dyn UserTokenRepository>, period: Duration) -> Self {
        Self { repo, period }
    }

    pub fn from_context(ctx: &ServiceContext, period: Duration) -> Self {
        Self::new(ctx.token_repo_handle(), period)
    }

    /// Run one sweep
    pub async fn run_once(&self) -> Result<u64, DomainError> {
        purge(self.repo.as_ref(), Utc::now()).await
    }

    /// Start sweeping. The first sweep runs immediately.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(period_secs = self.period.as_secs(), "Token purge task started");

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    warn!(error = %e, "Token purge failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Harness;
    use board_core::{Snowflake, UserRole, VerificationResult};

    fn forgot(identity: &str) -> ForgotPasswordRequest {
        ForgotPasswordRequest {
            username_or_email: identity.to_string(),
            captcha_token: Some("token".to_string()),
        }
    }

    fn reset(token: &str) -> ResetPasswordRequest {
        ResetPasswordRequest {
            token: token.to_string(),
            password: "a fresh password".to_string(),
        }
    }

    fn token_at(user: i64, expires_in: chrono::Duration) -> UserToken {
        UserToken::new(
            random_alphanumeric(USER_TOKEN_LENGTH),
            Snowflake::new(user),
            UserTokenType::PasswordReset,
            expires_in,
        )
    }

    #[tokio::test]
    async fn test_reset_flow() {
        let h = Harness::new();
        let user = h.user("anon", UserRole::User).await;
        let service = UserTokenService::new(&h.ctx);

        let token = service.forgot_password(forgot("anon@example.com")).await.unwrap();
        assert_eq!(token.value.len(), 48);
        assert_eq!(token.user_id, user.id);

        service.reset_password(reset(&token.value)).await.unwrap();
        let hash = h.ctx.user_repo().get_password_hash(user.id).await.unwrap().unwrap();
        assert!(h.ctx.password_service().verify("a fresh password", &hash).await.unwrap());

        // Single use
        let err = service.reset_password(reset(&token.value)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_new_token_replaces_old() {
        let h = Harness::new();
        h.user("anon", UserRole::User).await;
        let service = UserTokenService::new(&h.ctx);

        let first = service.forgot_password(forgot("anon")).await.unwrap();
        let second = service.forgot_password(forgot("anon")).await.unwrap();

        assert!(service.reset_password(reset(&first.value)).await.is_err());
        assert!(service.reset_password(reset(&second.value)).await.is_ok());
    }

    #[tokio::test]
    async fn test_rejected_captcha_and_unknown_user() {
        let h = Harness::with_captcha(VerificationResult::Invalid);
        h.user("anon", UserRole::User).await;
        let err = UserTokenService::new(&h.ctx)
            .forgot_password(forgot("anon"))
            .await
            .unwrap_err();
        let fields = err.field_errors().unwrap().field_errors();
        assert!(fields.keys().any(|k| k.to_string() == "captcha"));

        let h = Harness::new();
        let err = UserTokenService::new(&h.ctx)
            .forgot_password(forgot("nobody"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let h = Harness::new();
        let user = h.user("anon", UserRole::User).await;
        let mut token = token_at(0, chrono::Duration::minutes(-1));
        token.user_id = user.id;
        h.ctx.token_repo().issue(&token).await.unwrap();

        let err = UserTokenService::new(&h.ctx)
            .reset_password(reset(&token.value))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_purge_removes_only_expired() {
        let h = Harness::new();
        let repo = h.ctx.token_repo();
        let live = token_at(1, chrono::Duration::days(1));
        let expired = token_at(2, chrono::Duration::days(-1));
        let later = token_at(3, chrono::Duration::days(2));
        for token in [&live, &expired, &later] {
            repo.issue(token).await.unwrap();
        }

        let purged = UserTokenService::new(&h.ctx).purge_expired(Utc::now()).await.unwrap();
        assert_eq!(purged, 1);

        for (token, kept) in [(&live, true), (&expired, false), (&later, true)] {
            let found = repo
                .find_by_value_and_type(&token.value, UserTokenType::PasswordReset)
                .await
                .unwrap();
            assert_eq!(found.is_some(), kept);
        }
    }

    #[tokio::test]
    async fn test_consume_is_idempotent() {
        let h = Harness::new();
        let repo = h.ctx.token_repo();
        let token = token_at(1, chrono::Duration::days(1));
        repo.issue(&token).await.unwrap();

        assert!(repo.consume(token.user_id, &token.value, token.token_type).await.unwrap());
        assert!(!repo.consume(token.user_id, &token.value, token.token_type).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_task_sweeps() {
        let h = Harness::new();
        h.ctx
            .token_repo()
            .issue(&token_at(1, chrono::Duration::days(-1)))
            .await
            .unwrap();

        let task = TokenPurgeTask::from_context(&h.ctx, Duration::from_millis(10));
        assert_eq!(task.run_once().await.unwrap(), 1);

        h.ctx
            .token_repo()
            .issue(&token_at(2, chrono::Duration::days(-1)))
            .await
            .unwrap();
        let handle = TokenPurgeTask::from_context(&h.ctx, Duration::from_millis(10)).spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(h.ctx.token_repo().delete_expired(Utc::now()).await.unwrap(), 0);
    }
}
