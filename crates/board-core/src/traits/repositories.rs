//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{Ban, Board, Post, Thread, User, UserToken, UserTokenType};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Board Repository
// ============================================================================

#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Find board by its unique label
    async fn find_by_label(&self, label: &str) -> RepoResult<Option<Board>>;

    /// Find board by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Board>>;

    /// List all boards ordered by label
    async fn find_all(&self) -> RepoResult<Vec<Board>>;

    /// Create a board together with its settings
    async fn create(&self, board: &Board) -> RepoResult<()>;

    /// Update the board name and settings. The label and counter are left alone.
    async fn update(&self, board: &Board) -> RepoResult<()>;

    /// Delete a board with all of its threads
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Atomically bump the board's post counter and return the new value
    async fn increase_post_number(&self, label: &str) -> RepoResult<i64>;
}

// ============================================================================
// Thread Repository
// ============================================================================

#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Find thread by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Thread>>;

    /// Find thread by the post number of its original post
    async fn find_by_board_and_number(
        &self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Thread>>;

    /// One listing page: stickied threads first, then most recently bumped
    async fn find_by_board(
        &self,
        board_id: Snowflake,
        page: i64,
        per_page: i64,
    ) -> RepoResult<Vec<Thread>>;

    async fn set_locked(&self, id: Snowflake, locked: bool) -> RepoResult<()>;

    async fn set_stickied(&self, id: Snowflake, stickied: bool) -> RepoResult<()>;
}

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find post by its board-scoped number
    async fn find_by_board_and_number(
        &self,
        board_id: Snowflake,
        number: i64,
    ) -> RepoResult<Option<Post>>;

    /// All posts of a thread, oldest first
    async fn find_by_thread(&self, thread_id: Snowflake) -> RepoResult<Vec<Post>>;

    /// Replies with a post number greater than `after`, oldest first
    async fn find_replies_since(&self, thread_id: Snowflake, after: i64) -> RepoResult<Vec<Post>>;
}

// ============================================================================
// Attachment Repository
// ============================================================================

#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// How many stored attachments point at the same file in a folder
    async fn count_by_filename(&self, folder: &str, filename: &str) -> RepoResult<i64>;
}

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by username (case-sensitive)
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// List all users ordered by username
    async fn find_all(&self) -> RepoResult<Vec<User>>;

    /// Create a new user
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()>;

    /// Update an existing user
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>>;

    /// Update password hash
    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()>;

    /// Delete a user and their tokens
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// User Token Repository
// ============================================================================

#[async_trait]
pub trait UserTokenRepository: Send + Sync {
    /// Store a token, replacing any live token of the same (user, type)
    async fn issue(&self, token: &UserToken) -> RepoResult<()>;

    async fn find_by_value_and_type(
        &self,
        value: &str,
        token_type: UserTokenType,
    ) -> RepoResult<Option<UserToken>>;

    async fn find_by_user_and_type(
        &self,
        user_id: Snowflake,
        token_type: UserTokenType,
    ) -> RepoResult<Option<UserToken>>;

    /// Delete the token matching all three keys in one statement.
    /// Returns `true` only for the caller that actually removed it.
    async fn consume(
        &self,
        user_id: Snowflake,
        value: &str,
        token_type: UserTokenType,
    ) -> RepoResult<bool>;

    async fn delete_by_user_and_type(
        &self,
        user_id: Snowflake,
        token_type: UserTokenType,
    ) -> RepoResult<u64>;

    /// Delete every token with `expiration_at < before`
    async fn delete_expired(&self, before: DateTime<Utc>) -> RepoResult<u64>;

    async fn delete_by_user(&self, user_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Ban Repository
// ============================================================================

#[async_trait]
pub trait BanRepository: Send + Sync {
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Ban>>;

    /// All bans, newest first
    async fn find_all(&self) -> RepoResult<Vec<Ban>>;

    /// The `ACTIVE` ban on an IP, if any
    async fn find_active_by_ip(&self, ip: &str) -> RepoResult<Option<Ban>>;

    async fn create(&self, ban: &Ban) -> RepoResult<()>;

    /// Persist status, reason, end and unban fields
    async fn update(&self, ban: &Ban) -> RepoResult<()>;

    /// Mark every `ACTIVE` ban with `valid_to < before` as `EXPIRED`
    async fn expire_ended(&self, before: DateTime<Utc>) -> RepoResult<u64>;
}
