//! Post entity

use chrono::{DateTime, Utc};

use super::{Attachment, UserRole};
use crate::value_objects::Snowflake;

/// A single post. `post_number` is unique within the board and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Snowflake,
    pub thread_id: Snowflake,
    pub post_number: i64,
    pub name: String,
    pub tripcode: Option<String>,
    pub body: String,
    pub ip: String,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    /// Role badge copied at creation time; later role changes leave it untouched
    pub capcode: Option<UserRole>,
    pub deletion_code: String,
    pub sage: bool,
    pub poster_thread_id: Option<String>,
    pub original_post: bool,
    pub created_at: DateTime<Utc>,
    pub attachment: Option<Attachment>,
}

impl Post {
    #[inline]
    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }

    #[inline]
    pub fn is_original_post(&self) -> bool {
        self.original_post
    }

    /// Constant-time comparison of a poster-supplied deletion code
    pub fn deletion_code_matches(&self, candidate: &str) -> bool {
        let expected = self.deletion_code.as_bytes();
        let candidate = candidate.as_bytes();
        if expected.is_empty() || expected.len() != candidate.len() {
            return false;
        }
        expected
            .iter()
            .zip(candidate)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
