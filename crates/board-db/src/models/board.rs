//! Board database model (board row joined with its settings)

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct BoardModel {
    pub id: i64,
    pub label: String,
    pub name: String,
    pub post_counter: i64,
    pub created_at: DateTime<Utc>,
    pub thread_count: i64,
    pub attachment_categories: Vec<String>,
    pub default_poster_name: String,
    pub force_default_poster_name: bool,
    pub bump_limit: i32,
    pub thread_limit: i32,
    pub captcha_enabled: bool,
    pub country_flags: bool,
    pub poster_thread_ids: bool,
    pub nsfw: bool,
}
