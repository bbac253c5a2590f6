//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.
//! Posting forms arrive as multipart and are assembled by the API layer.

use board_core::{AttachmentCategory, UserRole};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// ============================================================================
// User Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 32, message = "Username must be 2-32 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,
}

/// Changes a user makes to their own account
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCurrentUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: Option<String>,

    /// Required when changing the password
    pub current_password: Option<String>,
}

/// Administrative edit of another account
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub role: Option<UserRole>,

    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(length(min = 1, max = 254, message = "Username or email is required"))]
    pub username_or_email: String,

    pub captcha_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,
}

// ============================================================================
// Board Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBoardRequest {
    #[validate(length(min = 1, max = 16, message = "Label must be 1-16 characters"))]
    pub label: String,

    #[validate(length(min = 1, max = 32, message = "Board name must be 1-32 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(nested)]
    pub settings: BoardSettingsRequest,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateBoardRequest {
    #[validate(length(min = 1, max = 32, message = "Board name must be 1-32 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub settings: BoardSettingsRequest,
}

/// Settings to change; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BoardSettingsRequest {
    pub attachment_categories: Option<Vec<AttachmentCategory>>,

    #[validate(length(min = 1, max = 32, message = "Default name must be 1-32 characters"))]
    pub default_poster_name: Option<String>,

    pub force_default_poster_name: Option<bool>,

    #[validate(range(min = 1, max = 10000, message = "Bump limit must be 1-10000"))]
    pub bump_limit: Option<i32>,

    #[validate(range(min = 1, max = 10000, message = "Thread limit must be 1-10000"))]
    pub thread_limit: Option<i32>,

    pub captcha_enabled: Option<bool>,
    pub country_flags: Option<bool>,
    pub poster_thread_ids: Option<bool>,
    pub nsfw: Option<bool>,
}

// ============================================================================
// Posting Requests
// ============================================================================

/// An uploaded file or a link to embed
#[derive(Debug, Clone)]
pub enum AttachmentUpload {
    File { original_filename: String, bytes: Bytes },
    Embed { url: String },
}

#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(length(max = 32, message = "Name must be at most 32 characters"))]
    pub name: Option<String>,

    /// Tripcode secret
    #[validate(length(max = 80, message = "Tripcode password must be at most 80 characters"))]
    pub password: Option<String>,

    #[validate(length(max = 10000, message = "Post must be at most 10000 characters"))]
    pub body: String,

    pub sage: bool,

    /// Show the poster's role badge
    pub capcode: bool,

    pub captcha_token: Option<String>,

    pub attachment: Option<AttachmentUpload>,
}

impl PostForm {
    pub fn has_body(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ThreadForm {
    pub subject: Option<String>,
    pub post: PostForm,
}

impl ThreadForm {
    /// Subject with surrounding whitespace removed; blank subjects count as none
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Who is posting, as seen by the API layer
#[derive(Debug, Clone, Default)]
pub struct PosterInfo {
    pub ip: String,
    /// ISO code from the proxy's country header
    pub country_code: Option<String>,
}

// ============================================================================
// Ban Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBanRequest {
    #[validate(length(min = 1, max = 64, message = "IP must be 1-64 characters"))]
    pub ip: String,

    #[validate(length(min = 1, max = 1000, message = "Reason must be 1-1000 characters"))]
    pub reason: String,

    /// Record a warning instead of blocking the IP
    #[serde(default)]
    pub warning: bool,

    /// End of the ban; permanent when absent. Ignored for warnings.
    pub valid_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBanRequest {
    #[validate(length(min = 1, max = 1000, message = "Reason must be 1-1000 characters"))]
    pub reason: String,

    pub valid_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UnbanRequest {
    #[validate(length(min = 1, max = 1000, message = "Reason must be 1-1000 characters"))]
    pub reason: String,
}

// ============================================================================
// Moderation Requests
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DeletePostRequest {
    pub deletion_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct ToggleRequest {
    pub value: bool,
}
