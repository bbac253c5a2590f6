//! Multipart posting form
//!
//! Thread and reply forms are sent as `multipart/form-data` so a file can travel with
//! the text fields. Unknown fields are ignored.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
};
use board_service::dto::{AttachmentUpload, PostForm, ThreadForm};
use tracing::debug;

use crate::response::ApiError;

/// hCaptcha's widget posts its token under this name
const HCAPTCHA_FIELD: &str = "h-captcha-response";

#[derive(Debug, Clone, Default)]
pub struct PostingForm {
    pub subject: Option<String>,
    pub post: PostForm,
}

impl PostingForm {
    pub fn into_thread_form(self) -> ThreadForm {
        ThreadForm {
            subject: self.subject,
            post: self.post,
        }
    }

    /// Replies have no subject; one sent anyway is dropped
    pub fn into_post_form(self) -> PostForm {
        self.post
    }
}

fn checkbox(value: &str) -> bool {
    matches!(value.trim(), "true" | "on" | "1")
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[async_trait]
impl<S> FromRequest<S> for PostingForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?;

        let mut form = PostingForm::default();
        let mut embed_url = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::invalid_body(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "file" {
                let original_filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid_body(e.body_text()))?;
                if !bytes.is_empty() {
                    form.post.attachment = Some(AttachmentUpload::File {
                        original_filename,
                        bytes,
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| ApiError::invalid_body(e.body_text()))?;
            match name.as_str() {
                "subject" => form.subject = non_empty(value),
                "name" => form.post.name = non_empty(value),
                "password" => form.post.password = non_empty(value),
                "body" => form.post.body = value,
                "sage" => form.post.sage = checkbox(&value),
                "capcode" => form.post.capcode = checkbox(&value),
                "captcha_token" | HCAPTCHA_FIELD => form.post.captcha_token = non_empty(value),
                "embed_url" => embed_url = non_empty(value.trim().to_string()),
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        if form.post.attachment.is_none() {
            form.post.attachment = embed_url.map(|url| AttachmentUpload::Embed { url });
        }

        Ok(form)
    }
}
