//! PostgreSQL posting unit of work
//!
//! The first statement of every posting transaction is the board counter update, which
//! takes the board row lock. Thread counting and eviction later in the same transaction
//! therefore see a stable picture of the board.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use board_core::entities::{Attachment, Post, Thread};
use board_core::traits::{PostingStore, PostingTransaction, RepoResult, ThreadActivity};
use board_core::value_objects::Snowflake;

use crate::models::ThreadModel;

use super::error::{map_db_error, post_not_found, thread_not_found};
use super::queries::{attachments_where, insert_post, with_original_posts};

/// Opens [`PgPostingTransaction`]s on a pool
#[derive(Clone)]
pub struct PgPostingStore {
    pool: PgPool,
}

impl PgPostingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostingStore for PgPostingStore {
    async fn begin(&self) -> RepoResult<Box<dyn PostingTransaction>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgPostingTransaction { tx }))
    }
}

pub struct PgPostingTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PgPostingTransaction {
    async fn board_of_thread(&mut self, thread_id: Snowflake) -> RepoResult<Snowflake> {
        let board_id: Option<i64> = sqlx::query_scalar("SELECT board_id FROM threads WHERE id = $1")
            .bind(thread_id.into_inner())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        board_id
            .map(Snowflake::new)
            .ok_or_else(|| thread_not_found(thread_id))
    }
}

#[async_trait]
impl PostingTransaction for PgPostingTransaction {
    #[instrument(skip(self))]
    async fn increase_post_number(&mut self, label: &str) -> RepoResult<Option<i64>> {
        sqlx::query_scalar(
            r"
            UPDATE boards SET post_counter = post_counter + 1
            WHERE label = $1
            RETURNING post_counter
            ",
        )
        .bind(label)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_thread_for_update(
        &mut self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Thread>> {
        let model = sqlx::query_as::<_, ThreadModel>(
            r"
            SELECT t.id, t.board_id, t.subject, t.locked, t.stickied,
                   t.created_at, t.last_bump_at, t.last_reply_at, 0::BIGINT AS reply_count
            FROM threads t
            JOIN posts op ON op.thread_id = t.id AND op.original_post
            WHERE t.board_id = $1 AND op.post_number = $2
            FOR UPDATE OF t
            ",
        )
        .bind(board_id.into_inner())
        .bind(number)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        let Some(model) = model else {
            return Ok(None);
        };

        let mut threads = with_original_posts(&mut self.tx, vec![model]).await?;
        let Some(mut thread) = threads.pop() else {
            return Ok(None);
        };
        thread.reply_count = self.count_replies(thread.id).await?;
        Ok(Some(thread))
    }

    #[instrument(skip(self))]
    async fn count_replies(&mut self, thread_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE thread_id = $1 AND NOT original_post")
            .bind(thread_id.into_inner())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self, thread), fields(thread_id = %thread.id))]
    async fn insert_thread(&mut self, thread: &Thread) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO threads (id, board_id, subject, locked, stickied,
                                 created_at, last_bump_at, last_reply_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(thread.id.into_inner())
        .bind(thread.board_id.into_inner())
        .bind(&thread.subject)
        .bind(thread.locked)
        .bind(thread.stickied)
        .bind(thread.created_at)
        .bind(thread.last_bump_at)
        .bind(thread.last_reply_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        insert_post(&mut self.tx, thread.board_id, &thread.original_post).await
    }

    #[instrument(skip(self, post), fields(post_id = %post.id, number = post.post_number))]
    async fn insert_post(&mut self, post: &Post) -> RepoResult<()> {
        let board_id = self.board_of_thread(post.thread_id).await?;
        insert_post(&mut self.tx, board_id, post).await
    }

    #[instrument(skip(self))]
    async fn update_thread_activity(
        &mut self,
        thread_id: Snowflake,
        activity: ThreadActivity,
    ) -> RepoResult<()> {
        let result =
            sqlx::query("UPDATE threads SET last_bump_at = $2, last_reply_at = $3 WHERE id = $1")
                .bind(thread_id.into_inner())
                .bind(activity.last_bump_at)
                .bind(activity.last_reply_at)
                .execute(&mut *self.tx)
                .await
                .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(thread_not_found(thread_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn count_live_threads(&mut self, board_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM threads WHERE board_id = $1 AND NOT stickied")
            .bind(board_id.into_inner())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_eviction_candidate(
        &mut self,
        board_id: Snowflake,
        exclude: Snowflake,
    ) -> RepoResult<Option<Snowflake>> {
        let id: Option<i64> = sqlx::query_scalar(
            r"
            SELECT id FROM threads
            WHERE board_id = $1 AND NOT stickied AND NOT locked AND id <> $2
            ORDER BY last_bump_at ASC, id ASC
            LIMIT 1
            ",
        )
        .bind(board_id.into_inner())
        .bind(exclude.into_inner())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(id.map(Snowflake::new))
    }

    #[instrument(skip(self))]
    async fn delete_thread(&mut self, thread_id: Snowflake) -> RepoResult<Vec<Attachment>> {
        let attachments = attachments_where(&mut self.tx, "p.thread_id = $1", thread_id).await?;

        let result = sqlx::query("DELETE FROM threads WHERE id = $1")
            .bind(thread_id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(thread_not_found(thread_id));
        }

        debug!(attachments = attachments.len(), "Thread deleted");
        Ok(attachments)
    }

    #[instrument(skip(self))]
    async fn delete_post(&mut self, post_id: Snowflake) -> RepoResult<Option<Attachment>> {
        let attachment = attachments_where(&mut self.tx, "p.id = $1", post_id)
            .await?
            .pop();

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id.into_inner())
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(post_not_found(post_id));
        }

        Ok(attachment)
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}
