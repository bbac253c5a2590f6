//! Ban database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct BanModel {
    pub id: i64,
    pub ip: String,
    pub status: String,
    pub reason: String,
    pub banned_by: Option<i64>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub unbanned_by: Option<i64>,
    pub unban_reason: Option<String>,
}
