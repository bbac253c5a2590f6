//! PostgreSQL implementation of AttachmentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use board_core::traits::{AttachmentRepository, RepoResult};

use super::error::map_db_error;

/// PostgreSQL implementation of AttachmentRepository
#[derive(Clone)]
pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    #[instrument(skip(self))]
    async fn count_by_filename(&self, folder: &str, filename: &str) -> RepoResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM attachments WHERE folder = $1 AND filename = $2")
            .bind(folder)
            .bind(filename)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgAttachmentRepository>();
    }
}
