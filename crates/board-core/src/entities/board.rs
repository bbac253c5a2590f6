//! Board entity - a content partition with its own numbering and settings

use chrono::{DateTime, Utc};

use super::AttachmentCategory;
use crate::constants::{
    DEFAULT_BUMP_LIMIT, DEFAULT_POSTER_NAME, DEFAULT_THREAD_LIMIT, MAX_BOARD_LABEL_LENGTH,
    THREADS_PER_PAGE,
};
use crate::value_objects::Snowflake;

/// A board. `label` is immutable once created and `post_counter` only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub id: Snowflake,
    pub label: String,
    pub name: String,
    /// Last post number issued on this board
    pub post_counter: i64,
    /// Threads currently on the board, computed at read time
    pub thread_count: i64,
    pub settings: BoardSettings,
    pub created_at: DateTime<Utc>,
}

impl Board {
    pub fn new(id: Snowflake, label: String, name: String) -> Self {
        Self {
            id,
            settings: BoardSettings::new(id),
            label,
            name,
            post_counter: 0,
            thread_count: 0,
            created_at: Utc::now(),
        }
    }

    /// Number of listing pages needed for the current thread count
    pub fn page_count(&self) -> i64 {
        if self.thread_count <= 0 {
            return 1;
        }
        (self.thread_count + THREADS_PER_PAGE - 1) / THREADS_PER_PAGE
    }

    /// Labels are short lowercase alphanumeric identifiers used in URLs
    pub fn is_valid_label(label: &str) -> bool {
        !label.is_empty()
            && label.len() <= MAX_BOARD_LABEL_LENGTH
            && label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    }
}

/// Per-board settings. Owned by exactly one board; `board_id` is the back-reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSettings {
    pub board_id: Snowflake,
    pub attachment_categories: Vec<AttachmentCategory>,
    pub default_poster_name: String,
    pub force_default_poster_name: bool,
    pub bump_limit: i32,
    pub thread_limit: i32,
    pub captcha_enabled: bool,
    pub country_flags: bool,
    pub poster_thread_ids: bool,
    pub nsfw: bool,
}

impl BoardSettings {
    pub fn new(board_id: Snowflake) -> Self {
        Self {
            board_id,
            attachment_categories: vec![
                AttachmentCategory::Image,
                AttachmentCategory::Video,
                AttachmentCategory::Audio,
            ],
            default_poster_name: DEFAULT_POSTER_NAME.to_string(),
            force_default_poster_name: false,
            bump_limit: DEFAULT_BUMP_LIMIT,
            thread_limit: DEFAULT_THREAD_LIMIT,
            captcha_enabled: false,
            country_flags: false,
            poster_thread_ids: false,
            nsfw: false,
        }
    }

    #[inline]
    pub fn allows(&self, category: AttachmentCategory) -> bool {
        self.attachment_categories.contains(&category)
    }
}
