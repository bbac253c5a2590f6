//! Post database model
//!
//! One row per post with its attachment and payload columns left-joined in.
//! Attachment columns are all `None` for posts without one.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct PostModel {
    pub id: i64,
    pub board_id: i64,
    pub thread_id: i64,
    pub post_number: i64,
    pub name: String,
    pub tripcode: Option<String>,
    pub body: String,
    pub ip: String,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub capcode: Option<String>,
    pub deletion_code: String,
    pub sage: bool,
    pub poster_thread_id: Option<String>,
    pub original_post: bool,
    pub created_at: DateTime<Utc>,

    // attachments
    pub attachment_id: Option<i64>,
    pub category: Option<String>,
    pub folder: Option<String>,
    pub original_filename: Option<String>,
    pub filename: Option<String>,
    pub thumbnail_filename: Option<String>,
    pub remote_storage_url: Option<String>,
    pub remote_storage_thumbnail_url: Option<String>,

    // attachment_metadata
    pub mime_type: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub thumbnail_width: Option<i32>,
    pub thumbnail_height: Option<i32>,
    pub file_size: Option<String>,
    pub duration: Option<String>,
    pub checksum: Option<String>,

    // embed_data
    pub embed_url: Option<String>,
    pub embed_thumbnail_url: Option<String>,
    pub provider_name: Option<String>,
    pub uploader_name: Option<String>,
    pub embed_title: Option<String>,
    pub rendered_html: Option<String>,
}

impl PostModel {
    #[inline]
    pub fn has_attachment(&self) -> bool {
        self.attachment_id.is_some()
    }
}
