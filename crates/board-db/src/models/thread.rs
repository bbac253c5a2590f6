//! Thread database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ThreadModel {
    pub id: i64,
    pub board_id: i64,
    pub subject: Option<String>,
    pub locked: bool,
    pub stickied: bool,
    pub created_at: DateTime<Utc>,
    pub last_bump_at: DateTime<Utc>,
    pub last_reply_at: DateTime<Utc>,
    pub reply_count: i64,
}
