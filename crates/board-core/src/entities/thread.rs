//! Thread entity

use chrono::{DateTime, Utc};

use super::Post;
use crate::value_objects::Snowflake;

/// A thread. It exists only together with its original post, which carries the
/// thread's lowest post number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: Snowflake,
    pub board_id: Snowflake,
    pub subject: Option<String>,
    pub locked: bool,
    pub stickied: bool,
    pub created_at: DateTime<Utc>,
    pub last_bump_at: DateTime<Utc>,
    pub last_reply_at: DateTime<Utc>,
    /// Replies, not counting the original post. Computed at read time.
    pub reply_count: i64,
    pub original_post: Post,
}

impl Thread {
    /// Build a fresh thread around its original post; all timestamps start at the
    /// post's creation time.
    pub fn new(id: Snowflake, board_id: Snowflake, subject: Option<String>, original_post: Post) -> Self {
        let now = original_post.created_at;
        Self {
            id,
            board_id,
            subject,
            locked: false,
            stickied: false,
            created_at: now,
            last_bump_at: now,
            last_reply_at: now,
            reply_count: 0,
            original_post,
        }
    }

    /// Board-scoped number of the thread, i.e. its original post's number
    #[inline]
    pub fn number(&self) -> i64 {
        self.original_post.post_number
    }

    /// Live threads count toward the board's thread limit
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.stickied
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn set_stickied(&mut self, stickied: bool) {
        self.stickied = stickied;
    }
}
