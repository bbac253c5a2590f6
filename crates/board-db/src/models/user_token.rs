//! User token database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct UserTokenModel {
    pub value: String,
    pub user_id: i64,
    pub token_type: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_at: DateTime<Utc>,
}

