//! PostgreSQL implementation of PostRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use board_core::entities::Post;
use board_core::traits::{PostRepository, RepoResult};
use board_core::value_objects::Snowflake;

use crate::models::PostModel;

use super::error::map_db_error;
use super::queries::{into_posts, POST_SELECT};

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn find_by_board_and_number(
        &self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Post>> {
        let sql = format!("{POST_SELECT} WHERE p.board_id = $1 AND p.post_number = $2");
        let result = sqlx::query_as::<_, PostModel>(&sql)
            .bind(board_id.into_inner())
            .bind(number)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Post::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_thread(&self, thread_id: Snowflake) -> RepoResult<Vec<Post>> {
        let sql = format!("{POST_SELECT} WHERE p.thread_id = $1 ORDER BY p.post_number ASC");
        let results = sqlx::query_as::<_, PostModel>(&sql)
            .bind(thread_id.into_inner())
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_posts(results)
    }

    #[instrument(skip(self))]
    async fn find_replies_since(&self, thread_id: Snowflake, after: i64) -> RepoResult<Vec<Post>> {
        let sql = format!(
            r"{POST_SELECT}
            WHERE p.thread_id = $1 AND NOT p.original_post AND p.post_number > $2
            ORDER BY p.post_number ASC"
        );
        let results = sqlx::query_as::<_, PostModel>(&sql)
            .bind(thread_id.into_inner())
            .bind(after)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        into_posts(results)
    }
}
