//! Posting unit of work
//!
//! Everything one posting operation writes (counter increment, thread and post rows,
//! bump timestamps, eviction) goes through a single [`PostingTransaction`]. Dropping a
//! transaction without committing discards its writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::RepoResult;
use crate::entities::{Attachment, Post, Thread};
use crate::value_objects::Snowflake;

/// New bump/reply timestamps for a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadActivity {
    pub last_bump_at: DateTime<Utc>,
    pub last_reply_at: DateTime<Utc>,
}

#[async_trait]
pub trait PostingStore: Send + Sync {
    async fn begin(&self) -> RepoResult<Box<dyn PostingTransaction>>;
}

#[async_trait]
pub trait PostingTransaction: Send {
    /// Increment the board counter and return the new value, or `None` when no board
    /// has this label. Holds the board row lock until the transaction ends.
    async fn increase_post_number(&mut self, label: &str) -> RepoResult<Option<i64>>;

    /// Load a thread by number and lock it for the rest of the transaction
    async fn find_thread_for_update(
        &mut self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Thread>>;

    /// Replies in the thread, excluding the original post
    async fn count_replies(&mut self, thread_id: Snowflake) -> RepoResult<i64>;

    /// Insert a thread with its original post and attachment
    async fn insert_thread(&mut self, thread: &Thread) -> RepoResult<()>;

    /// Insert a reply with its attachment
    async fn insert_post(&mut self, post: &Post) -> RepoResult<()>;

    async fn update_thread_activity(
        &mut self,
        thread_id: Snowflake,
        activity: ThreadActivity,
    ) -> RepoResult<()>;

    /// Non-stickied threads currently on the board
    async fn count_live_threads(&mut self, board_id: Snowflake) -> RepoResult<i64>;

    /// Oldest-bumped thread that may be evicted: not stickied, not locked, not `exclude`.
    /// Ties on `last_bump_at` go to the lower id.
    async fn find_eviction_candidate(
        &mut self,
        board_id: Snowflake,
        exclude: Snowflake,
    ) -> RepoResult<Option<Snowflake>>;

    /// Delete a thread with all posts and return the attachments that went with it
    async fn delete_thread(&mut self, thread_id: Snowflake) -> RepoResult<Vec<Attachment>>;

    /// Delete a single reply and return its attachment
    async fn delete_post(&mut self, post_id: Snowflake) -> RepoResult<Option<Attachment>>;

    async fn commit(self: Box<Self>) -> RepoResult<()>;

    async fn rollback(self: Box<Self>) -> RepoResult<()>;
}
