//! PostgreSQL implementation of UserTokenRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use board_core::entities::{UserToken, UserTokenType};
use board_core::traits::{RepoResult, UserTokenRepository};
use board_core::value_objects::Snowflake;

use crate::models::UserTokenModel;

use super::error::map_db_error;

/// PostgreSQL implementation of UserTokenRepository
#[derive(Clone)]
pub struct PgUserTokenRepository {
    pool: PgPool,
}

impl PgUserTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserTokenRepository for PgUserTokenRepository {
    #[instrument(skip(self, token), fields(user_id = %token.user_id, token_type = %token.token_type))]
    async fn issue(&self, token: &UserToken) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token_type = $2")
            .bind(token.user_id.into_inner())
            .bind(token.token_type.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO user_tokens (value, user_id, token_type, issued_at, expiration_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&token.value)
        .bind(token.user_id.into_inner())
        .bind(token.token_type.as_str())
        .bind(token.issued_at)
        .bind(token.expiration_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, value))]
    async fn find_by_value_and_type(
        &self,
        value: &str,
        token_type: UserTokenType,
    ) -> RepoResult<Option<UserToken>> {
        let result = sqlx::query_as::<_, UserTokenModel>(
            r"
            SELECT value, user_id, token_type, issued_at, expiration_at
            FROM user_tokens
            WHERE value = $1 AND token_type = $2
            ",
        )
        .bind(value)
        .bind(token_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserToken::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_user_and_type(
        &self,
        user_id: Snowflake,
        token_type: UserTokenType,
    ) -> RepoResult<Option<UserToken>> {
        let result = sqlx::query_as::<_, UserTokenModel>(
            r"
            SELECT value, user_id, token_type, issued_at, expiration_at
            FROM user_tokens
            WHERE user_id = $1 AND token_type = $2
            ",
        )
        .bind(user_id.into_inner())
        .bind(token_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserToken::try_from).transpose()
    }

    #[instrument(skip(self, value))]
    async fn consume(
        &self,
        user_id: Snowflake,
        value: &str,
        token_type: UserTokenType,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            "DELETE FROM user_tokens WHERE user_id = $1 AND value = $2 AND token_type = $3",
        )
        .bind(user_id.into_inner())
        .bind(value)
        .bind(token_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn delete_by_user_and_type(
        &self,
        user_id: Snowflake,
        token_type: UserTokenType,
    ) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token_type = $2")
            .bind(user_id.into_inner())
            .bind(token_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE expiration_at < $1")
            .bind(before)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_by_user(&self, user_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = $1")
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
