//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use board_core::{AttachmentCategory, Authorities, BanStatus, UserRole};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Board Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BoardResponse {
    pub id: String,
    pub label: String,
    pub name: String,
    pub post_counter: i64,
    pub thread_count: i64,
    pub page_count: i64,
    pub created_at: DateTime<Utc>,
    pub settings: BoardSettingsResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardSettingsResponse {
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

// ============================================================================
// Thread & Post Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentResponse {
    pub id: String,
    pub category: AttachmentCategory,
    pub original_filename: String,
    /// Storage path relative to the content root; the embed URL for embeds
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AttachmentMetadataResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<EmbedResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentMetadataResponse {
    pub mime_type: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_height: Option<u32>,
    pub file_size: String,
    pub duration: Option<String>,
    pub checksum: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedResponse {
    pub embed_url: String,
    pub provider_name: String,
    pub thumbnail_url: Option<String>,
    pub uploader_name: Option<String>,
    pub title: Option<String>,
    pub rendered_html: Option<String>,
}

/// A post as shown to readers. Deletion codes never appear here.
#[derive(Debug, Clone, Serialize)]
pub struct PostResponse {
    pub id: String,
    pub post_number: i64,
    pub name: String,
    pub tripcode: Option<String>,
    pub body: String,
    pub capcode: Option<UserRole>,
    pub sage: bool,
    pub original_post: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    /// Only for viewers with `VIEW_IP`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub attachment: Option<AttachmentResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadSummaryResponse {
    pub id: String,
    pub number: i64,
    pub subject: Option<String>,
    pub locked: bool,
    pub stickied: bool,
    pub reply_count: i64,
    pub created_at: DateTime<Utc>,
    pub last_bump_at: DateTime<Utc>,
    pub last_reply_at: DateTime<Utc>,
    pub original_post: PostResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadResponse {
    #[serde(flatten)]
    pub thread: ThreadSummaryResponse,
    /// Every post including the original, oldest first
    pub posts: Vec<PostResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreadPageResponse {
    pub board: String,
    pub page: i64,
    pub page_count: i64,
    pub threads: Vec<ThreadSummaryResponse>,
}

/// Result of creating a thread or reply. The deletion code is only ever shown here.
#[derive(Debug, Clone, Serialize)]
pub struct PostCreatedResponse {
    pub board: String,
    pub thread_number: i64,
    pub post_number: i64,
    pub deletion_code: String,
    pub post: PostResponse,
}

// ============================================================================
// User Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub authorities: Authorities,
    pub enabled: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BanResponse {
    pub id: String,
    pub ip: String,
    pub status: BanStatus,
    pub reason: String,
    pub banned_by: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub unbanned_by: Option<String>,
    pub unban_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserResponse,
}

// ============================================================================
// Health Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
