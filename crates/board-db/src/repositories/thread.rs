//! PostgreSQL implementation of ThreadRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use board_core::entities::Thread;
use board_core::traits::{RepoResult, ThreadRepository};
use board_core::value_objects::Snowflake;

use crate::models::ThreadModel;

use super::error::{map_db_error, thread_not_found};
use super::queries::{with_original_posts, THREAD_SELECT};

/// PostgreSQL implementation of ThreadRepository
#[derive(Clone)]
pub struct PgThreadRepository {
    pool: PgPool,
}

impl PgThreadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_flag(&self, id: Snowflake, column: &str, value: bool) -> RepoResult<()> {
        let sql = format!("UPDATE threads SET {column} = $2 WHERE id = $1");
        let result = sqlx::query(&sql)
            .bind(id.into_inner())
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(thread_not_found(id));
        }

        Ok(())
    }

    async fn load(&self, models: Vec<ThreadModel>) -> RepoResult<Vec<Thread>> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        with_original_posts(&mut conn, models).await
    }
}

#[async_trait]
impl ThreadRepository for PgThreadRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Thread>> {
        let sql = format!("{THREAD_SELECT} WHERE t.id = $1");
        let result = sqlx::query_as::<_, ThreadModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(self.load(result.into_iter().collect()).await?.pop())
    }

    #[instrument(skip(self))]
    async fn find_by_board_and_number(
        &self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Thread>> {
        let sql = format!(
            r"{THREAD_SELECT}
            JOIN posts op ON op.thread_id = t.id AND op.original_post
            WHERE t.board_id = $1 AND op.post_number = $2"
        );
        let result = sqlx::query_as::<_, ThreadModel>(&sql)
            .bind(board_id.into_inner())
            .bind(number)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(self.load(result.into_iter().collect()).await?.pop())
    }

    #[instrument(skip(self))]
    async fn find_by_board(
        &self,
        board_id: Snowflake,
        page: i64,
        per_page: i64,
    ) -> RepoResult<Vec<Thread>> {
        // Past any representable offset there is nothing to list
        let Some(offset) = page.max(0).checked_mul(per_page) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            r"{THREAD_SELECT}
            WHERE t.board_id = $1
            ORDER BY t.stickied DESC, t.last_bump_at DESC, t.id DESC
            LIMIT $2 OFFSET $3"
        );
        let results = sqlx::query_as::<_, ThreadModel>(&sql)
            .bind(board_id.into_inner())
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        self.load(results).await
    }

    #[instrument(skip(self))]
    async fn set_locked(&self, id: Snowflake, locked: bool) -> RepoResult<()> {
        self.set_flag(id, "locked", locked).await
    }

    #[instrument(skip(self))]
    async fn set_stickied(&self, id: Snowflake, stickied: bool) -> RepoResult<()> {
        self.set_flag(id, "stickied", stickied).await
    }
}
