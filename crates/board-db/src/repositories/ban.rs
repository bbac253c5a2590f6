//! PostgreSQL implementation of BanRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use board_core::entities::{Ban, BanStatus};
use board_core::error::DomainError;
use board_core::traits::{BanRepository, RepoResult};
use board_core::value_objects::Snowflake;

use crate::models::BanModel;

use super::error::{map_db_error, map_unique_violation};

const BAN_SELECT: &str = r"
    SELECT id, ip, status, reason, banned_by, valid_from, valid_to, unbanned_by, unban_reason
    FROM bans";

/// PostgreSQL implementation of BanRepository
#[derive(Clone)]
pub struct PgBanRepository {
    pool: PgPool,
}

impl PgBanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BanRepository for PgBanRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ban>> {
        let sql = format!("{BAN_SELECT} WHERE id = $1");
        let result = sqlx::query_as::<_, BanModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Ban::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<Ban>> {
        let sql = format!("{BAN_SELECT} ORDER BY valid_from DESC, id DESC");
        let results = sqlx::query_as::<_, BanModel>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        results.into_iter().map(Ban::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_active_by_ip(&self, ip: &str) -> RepoResult<Option<Ban>> {
        let sql = format!("{BAN_SELECT} WHERE ip = $1 AND status = $2");
        let result = sqlx::query_as::<_, BanModel>(&sql)
            .bind(ip)
            .bind(BanStatus::Active.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Ban::try_from).transpose()
    }

    #[instrument(skip(self, ban), fields(ban_id = %ban.id, status = %ban.status))]
    async fn create(&self, ban: &Ban) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO bans
                (id, ip, status, reason, banned_by, valid_from, valid_to, unbanned_by, unban_reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(ban.id.into_inner())
        .bind(&ban.ip)
        .bind(ban.status.as_str())
        .bind(&ban.reason)
        .bind(ban.banned_by.map(Snowflake::into_inner))
        .bind(ban.valid_from)
        .bind(ban.valid_to)
        .bind(ban.unbanned_by.map(Snowflake::into_inner))
        .bind(&ban.unban_reason)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::BanAlreadyActive(ban.ip.clone())))?;

        Ok(())
    }

    #[instrument(skip(self, ban), fields(ban_id = %ban.id, status = %ban.status))]
    async fn update(&self, ban: &Ban) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE bans
            SET status = $2, reason = $3, valid_to = $4, unbanned_by = $5, unban_reason = $6
            WHERE id = $1
            ",
        )
        .bind(ban.id.into_inner())
        .bind(ban.status.as_str())
        .bind(&ban.reason)
        .bind(ban.valid_to)
        .bind(ban.unbanned_by.map(Snowflake::into_inner))
        .bind(&ban.unban_reason)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::BanNotFound(ban.id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn expire_ended(&self, before: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query(
            "UPDATE bans SET status = $1 WHERE status = $2 AND valid_to IS NOT NULL AND valid_to < $3",
        )
        .bind(BanStatus::Expired.as_str())
        .bind(BanStatus::Active.as_str())
        .bind(before)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgBanRepository>();
    }
}
