//! PostgreSQL implementation of BoardRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use board_core::entities::Board;
use board_core::error::DomainError;
use board_core::traits::{BoardRepository, RepoResult};
use board_core::value_objects::Snowflake;

use crate::mappers::category_names;
use crate::models::BoardModel;

use super::error::{board_id_not_found, board_not_found, map_db_error, map_unique_violation};
use super::queries::BOARD_SELECT;

/// PostgreSQL implementation of BoardRepository
#[derive(Clone)]
pub struct PgBoardRepository {
    pool: PgPool,
}

impl PgBoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoardRepository for PgBoardRepository {
    #[instrument(skip(self))]
    async fn find_by_label(&self, label: &str) -> RepoResult<Option<Board>> {
        let sql = format!("{BOARD_SELECT} WHERE b.label = $1");
        let result = sqlx::query_as::<_, BoardModel>(&sql)
            .bind(label)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Board::from))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Board>> {
        let sql = format!("{BOARD_SELECT} WHERE b.id = $1");
        let result = sqlx::query_as::<_, BoardModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Board::from))
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> RepoResult<Vec<Board>> {
        let sql = format!("{BOARD_SELECT} ORDER BY b.label");
        let results = sqlx::query_as::<_, BoardModel>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(results.into_iter().map(Board::from).collect())
    }

    #[instrument(skip(self, board), fields(label = %board.label))]
    async fn create(&self, board: &Board) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO boards (id, label, name, post_counter, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(board.id.into_inner())
        .bind(&board.label)
        .bind(&board.name)
        .bind(board.post_counter)
        .bind(board.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, |_| DomainError::BoardLabelExists(board.label.clone())))?;

        let settings = &board.settings;
        sqlx::query(
            r"
            INSERT INTO board_settings (board_id, attachment_categories, default_poster_name,
                                        force_default_poster_name, bump_limit, thread_limit,
                                        captcha_enabled, country_flags, poster_thread_ids, nsfw)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(board.id.into_inner())
        .bind(category_names(&settings.attachment_categories))
        .bind(&settings.default_poster_name)
        .bind(settings.force_default_poster_name)
        .bind(settings.bump_limit)
        .bind(settings.thread_limit)
        .bind(settings.captcha_enabled)
        .bind(settings.country_flags)
        .bind(settings.poster_thread_ids)
        .bind(settings.nsfw)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, board), fields(label = %board.label))]
    async fn update(&self, board: &Board) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query("UPDATE boards SET name = $2 WHERE id = $1")
            .bind(board.id.into_inner())
            .bind(&board.name)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(board_id_not_found(board.id));
        }

        let settings = &board.settings;
        sqlx::query(
            r"
            UPDATE board_settings
            SET attachment_categories = $2, default_poster_name = $3,
                force_default_poster_name = $4, bump_limit = $5, thread_limit = $6,
                captcha_enabled = $7, country_flags = $8, poster_thread_ids = $9, nsfw = $10
            WHERE board_id = $1
            ",
        )
        .bind(board.id.into_inner())
        .bind(category_names(&settings.attachment_categories))
        .bind(&settings.default_poster_name)
        .bind(settings.force_default_poster_name)
        .bind(settings.bump_limit)
        .bind(settings.thread_limit)
        .bind(settings.captcha_enabled)
        .bind(settings.country_flags)
        .bind(settings.poster_thread_ids)
        .bind(settings.nsfw)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(board_id_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn increase_post_number(&self, label: &str) -> RepoResult<i64> {
        let counter: Option<i64> = sqlx::query_scalar(
            r"
            UPDATE boards SET post_counter = post_counter + 1
            WHERE label = $1
            RETURNING post_counter
            ",
        )
        .bind(label)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        counter.ok_or_else(|| board_not_found(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgBoardRepository>();
    }
}
