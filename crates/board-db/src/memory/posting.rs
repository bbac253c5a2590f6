use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use board_core::bump::ThreadBumpEngine;
use board_core::entities::{Attachment, Post, Thread};
use board_core::traits::{PostingStore, PostingTransaction, RepoResult, ThreadActivity};
use board_core::value_objects::Snowflake;

use super::state::{MemoryState, StoredPost};
use super::MemoryStore;
use crate::repositories::error::{post_not_found, thread_not_found};

/// Works on a full copy of the state and writes it back on commit, so each transaction
/// costs time proportional to the whole store. Fine for tests; not meant for volume.
pub struct MemoryPostingTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl PostingStore for MemoryStore {
    async fn begin(&self) -> RepoResult<Box<dyn PostingTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryPostingTransaction { guard, working }))
    }
}

#[async_trait]
impl PostingTransaction for MemoryPostingTransaction {
    async fn increase_post_number(&mut self, label: &str) -> RepoResult<Option<i64>> {
        Ok(self
            .working
            .boards
            .values_mut()
            .find(|b| b.label == label)
            .map(|board| {
                board.post_counter += 1;
                board.post_counter
            }))
    }

    async fn find_thread_for_update(
        &mut self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Thread>> {
        Ok(self
            .working
            .thread_by_number(board_id, number)
            .map(|t| self.working.thread_view(t)))
    }

    async fn count_replies(&mut self, thread_id: Snowflake) -> RepoResult<i64> {
        Ok(self.working.reply_count(thread_id))
    }

    async fn insert_thread(&mut self, thread: &Thread) -> RepoResult<()> {
        let op = &thread.original_post;
        self.working.posts.insert(
            op.id,
            StoredPost {
                board_id: thread.board_id,
                post: op.clone(),
            },
        );
        self.working.threads.insert(thread.id, thread.clone());
        Ok(())
    }

    async fn insert_post(&mut self, post: &Post) -> RepoResult<()> {
        let board_id = self
            .working
            .threads
            .get(&post.thread_id)
            .map(|t| t.board_id)
            .ok_or_else(|| thread_not_found(post.thread_id))?;
        self.working.posts.insert(
            post.id,
            StoredPost {
                board_id,
                post: post.clone(),
            },
        );
        Ok(())
    }

    async fn update_thread_activity(
        &mut self,
        thread_id: Snowflake,
        activity: ThreadActivity,
    ) -> RepoResult<()> {
        let thread = self
            .working
            .threads
            .get_mut(&thread_id)
            .ok_or_else(|| thread_not_found(thread_id))?;
        thread.last_bump_at = activity.last_bump_at;
        thread.last_reply_at = activity.last_reply_at;
        Ok(())
    }

    async fn count_live_threads(&mut self, board_id: Snowflake) -> RepoResult<i64> {
        Ok(self
            .working
            .threads
            .values()
            .filter(|t| t.board_id == board_id && t.is_live())
            .count() as i64)
    }

    async fn find_eviction_candidate(
        &mut self,
        board_id: Snowflake,
        exclude: Snowflake,
    ) -> RepoResult<Option<Snowflake>> {
        let on_board = self.working.threads.values().filter(|t| t.board_id == board_id);
        Ok(ThreadBumpEngine::select_eviction_victim(on_board, exclude).map(|t| t.id))
    }

    async fn delete_thread(&mut self, thread_id: Snowflake) -> RepoResult<Vec<Attachment>> {
        self.working
            .remove_thread(thread_id)
            .ok_or_else(|| thread_not_found(thread_id))
    }

    async fn delete_post(&mut self, post_id: Snowflake) -> RepoResult<Option<Attachment>> {
        self.working
            .posts
            .remove(&post_id)
            .map(|stored| stored.post.attachment)
            .ok_or_else(|| post_not_found(post_id))
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        Ok(())
    }
}
