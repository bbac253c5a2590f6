//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use board_core::entities::{
    Attachment, AttachmentPayload, Ban, Board, BoardSettings, Post, Thread, User,
};

use super::responses::{
    AttachmentMetadataResponse, AttachmentResponse, BanResponse, BoardResponse, BoardSettingsResponse,
    EmbedResponse, PostResponse, ThreadSummaryResponse, UserResponse,
};

// ============================================================================
// Board Mappers
// ============================================================================

impl From<&BoardSettings> for BoardSettingsResponse {
    fn from(settings: &BoardSettings) -> Self {
        Self {
            attachment_categories: settings.attachment_categories.clone(),
            default_poster_name: settings.default_poster_name.clone(),
            force_default_poster_name: settings.force_default_poster_name,
            bump_limit: settings.bump_limit,
            thread_limit: settings.thread_limit,
            captcha_enabled: settings.captcha_enabled,
            country_flags: settings.country_flags,
            poster_thread_ids: settings.poster_thread_ids,
            nsfw: settings.nsfw,
        }
    }
}

impl From<&Board> for BoardResponse {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id.to_string(),
            label: board.label.clone(),
            name: board.name.clone(),
            post_counter: board.post_counter,
            thread_count: board.thread_count,
            page_count: board.page_count(),
            created_at: board.created_at,
            settings: BoardSettingsResponse::from(&board.settings),
        }
    }
}

impl From<Board> for BoardResponse {
    fn from(board: Board) -> Self {
        Self::from(&board)
    }
}

// ============================================================================
// Post Mappers
// ============================================================================

impl From<&Attachment> for AttachmentResponse {
    fn from(attachment: &Attachment) -> Self {
        let (metadata, embed) = match &attachment.payload {
            AttachmentPayload::Local(m) => (
                Some(AttachmentMetadataResponse {
                    mime_type: m.mime_type.clone(),
                    width: m.width,
                    height: m.height,
                    thumbnail_width: m.thumbnail_width,
                    thumbnail_height: m.thumbnail_height,
                    file_size: m.file_size.clone(),
                    duration: m.duration.clone(),
                    checksum: m.checksum.clone(),
                }),
                None,
            ),
            AttachmentPayload::Embed(e) => (
                None,
                Some(EmbedResponse {
                    embed_url: e.embed_url.clone(),
                    provider_name: e.provider_name.clone(),
                    thumbnail_url: e.thumbnail_url.clone(),
                    uploader_name: e.uploader_name.clone(),
                    title: e.title.clone(),
                    rendered_html: e.rendered_html.clone(),
                }),
            ),
        };

        Self {
            id: attachment.id.to_string(),
            category: attachment.category,
            original_filename: attachment.original_filename.clone(),
            path: attachment
                .file_path()
                .unwrap_or_else(|| attachment.filename.clone()),
            thumbnail_path: attachment.thumbnail_path(),
            metadata,
            embed,
        }
    }
}

impl From<&Post> for PostResponse {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            post_number: post.post_number,
            name: post.name.clone(),
            tripcode: post.tripcode.clone(),
            body: post.body.clone(),
            capcode: post.capcode,
            sage: post.sage,
            original_post: post.original_post,
            poster_thread_id: post.poster_thread_id.clone(),
            country_code: post.country_code.clone(),
            country_name: post.country_name.clone(),
            ip: None,
            created_at: post.created_at,
            attachment: post.attachment.as_ref().map(AttachmentResponse::from),
        }
    }
}

impl PostResponse {
    /// Include the poster's address for moderators
    pub fn with_ip(mut self, post: &Post, visible: bool) -> Self {
        if visible {
            self.ip = Some(post.ip.clone());
        }
        self
    }
}

impl From<&Thread> for ThreadSummaryResponse {
    fn from(thread: &Thread) -> Self {
        Self {
            id: thread.id.to_string(),
            number: thread.number(),
            subject: thread.subject.clone(),
            locked: thread.locked,
            stickied: thread.stickied,
            reply_count: thread.reply_count,
            created_at: thread.created_at,
            last_bump_at: thread.last_bump_at,
            last_reply_at: thread.last_reply_at,
            original_post: PostResponse::from(&thread.original_post),
        }
    }
}

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            authorities: user.authorities(),
            enabled: user.enabled,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<Ban> for BanResponse {
    fn from(ban: Ban) -> Self {
        Self {
            id: ban.id.to_string(),
            banned_by: ban.banned_by.map(|id| id.to_string()),
            unbanned_by: ban.unbanned_by.map(|id| id.to_string()),
            ip: ban.ip,
            status: ban.status,
            reason: ban.reason,
            valid_from: ban.valid_from,
            valid_to: ban.valid_to,
            unban_reason: ban.unban_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::{Snowflake, UserRole};
    use chrono::Utc;

    fn post() -> Post {
        Post {
            id: Snowflake::new(3),
            thread_id: Snowflake::new(2),
            post_number: 7,
            name: "Anonymous".to_string(),
            tripcode: None,
            body: "hello".to_string(),
            ip: "10.0.0.1".to_string(),
            country_code: None,
            country_name: None,
            capcode: None,
            deletion_code: "secretsecretsecr".to_string(),
            sage: false,
            poster_thread_id: None,
            original_post: true,
            created_at: Utc::now(),
            attachment: None,
        }
    }

    #[test]
    fn test_post_response_hides_ip_and_code() {
        let post = post();
        let json = serde_json::to_value(PostResponse::from(&post)).unwrap();
        assert_eq!(json["post_number"], 7);
        assert_eq!(json["id"], "3");
        assert!(json.get("ip").is_none());
        assert!(json.get("deletion_code").is_none());

        let json = serde_json::to_value(PostResponse::from(&post).with_ip(&post, true)).unwrap();
        assert_eq!(json["ip"], "10.0.0.1");
    }

    #[test]
    fn test_thread_summary_uses_op_number() {
        let thread = Thread::new(Snowflake::new(2), Snowflake::new(1), Some("hi".to_string()), post());
        let summary = ThreadSummaryResponse::from(&thread);
        assert_eq!(summary.number, 7);
        assert_eq!(summary.id, "2");
    }

    #[test]
    fn test_user_response_lists_authorities() {
        let mut user = User::new(Snowflake::new(1), "jan".to_string(), "jan@example.com".to_string());
        user.set_role(UserRole::Janitor);
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(json["role"], "JANITOR");
        assert_eq!(json["authorities"], serde_json::json!(["DELETE_POST"]));
    }

    #[test]
    fn test_board_response_page_count() {
        let mut board = Board::new(Snowflake::new(1), "fit".to_string(), "Fitness".to_string());
        board.thread_count = 11;
        let response = BoardResponse::from(&board);
        assert_eq!(response.page_count, 2);
        assert_eq!(response.settings.bump_limit, 300);
    }
}
