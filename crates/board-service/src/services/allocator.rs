//! Board-scoped post numbers
//!
//! Numbers come from an atomic increment of the board's counter in the store. There is
//! no in-process lock: the row lock taken by the increment orders concurrent callers, and
//! a rolled-back transaction returns its number along with everything else it wrote.

use board_core::{DomainError, PostingTransaction};
use tracing::{debug, instrument};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct PostNumberAllocator<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PostNumberAllocator<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Take the next number outside any posting transaction
    #[instrument(skip(self))]
    pub async fn allocate(&self, label: &str) -> ServiceResult<i64> {
        let number = self.ctx.board_repo().increase_post_number(label).await?;
        debug!(number, "Post number allocated");
        Ok(number)
    }

    /// Take the next number inside `tx`. The board stays locked until `tx` ends.
    pub async fn allocate_in(tx: &mut dyn PostingTransaction, label: &str) -> ServiceResult<i64> {
        tx.increase_post_number(label)
            .await?
            .ok_or_else(|| DomainError::BoardNotFound(label.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::services::test_support::Harness;
    use crate::services::ServiceError;

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct_and_gapless() {
        let harness = Harness::new();
        harness.board("fit").await;
        let ctx = Arc::new(harness.ctx.clone());

        let mut handles = Vec::new();
        for _ in 0..50 {
            let ctx = Arc::clone(&ctx);
            handles.push(tokio::spawn(async move {
                PostNumberAllocator::new(&ctx).allocate("fit").await.unwrap()
            }));
        }

        let mut issued = HashSet::new();
        for handle in handles {
            assert!(issued.insert(handle.await.unwrap()));
        }
        assert_eq!(issued.len(), 50);
        assert_eq!(issued.iter().max(), Some(&50));
        assert_eq!(issued.iter().min(), Some(&1));

        let board = ctx.board_repo().find_by_label("fit").await.unwrap().unwrap();
        assert_eq!(board.post_counter, 50);
    }

    #[tokio::test]
    async fn test_unknown_board() {
        let harness = Harness::new();
        let err = PostNumberAllocator::new(&harness.ctx)
            .allocate("xxx")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::BoardNotFound(_))));
    }

    #[tokio::test]
    async fn test_rolled_back_allocation_is_returned() {
        let harness = Harness::new();
        harness.board("fit").await;

        let mut tx = harness.ctx.posting_store().begin().await.unwrap();
        assert_eq!(PostNumberAllocator::allocate_in(tx.as_mut(), "fit").await.unwrap(), 1);
        tx.rollback().await.unwrap();

        let mut tx = harness.ctx.posting_store().begin().await.unwrap();
        assert_eq!(PostNumberAllocator::allocate_in(tx.as_mut(), "fit").await.unwrap(), 1);
        tx.commit().await.unwrap();

        assert_eq!(
            PostNumberAllocator::new(&harness.ctx).allocate("fit").await.unwrap(),
            2
        );
    }
}
