//! In-memory fixtures shared by the service tests

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use board_common::JwtService;
use board_core::{
    Board, BoardSettings, CaptchaVerifier, Snowflake, User, UserRole, VerificationResult,
};
use board_db::MemoryStore;
use board_media::{
    AttachmentProcessor, EmbedPreview, EmbedResolver, MemoryFileStorage, ProcessorConfig,
};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use reqwest::Url;

use super::context::{ServiceContext, ServiceContextBuilder};
use crate::dto::{AttachmentUpload, PostForm, PosterInfo, ThreadForm};

pub struct StaticCaptcha(pub VerificationResult);

#[async_trait]
impl CaptchaVerifier for StaticCaptcha {
    async fn verify_captcha_token(&self, _token: &str) -> VerificationResult {
        self.0
    }
}

struct NoPreview;

#[async_trait]
impl EmbedResolver for NoPreview {
    async fn resolve(&self, _url: &Url) -> Option<EmbedPreview> {
        None
    }
}

pub struct Harness {
    pub ctx: ServiceContext,
    pub files: Arc<MemoryFileStorage>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_captcha(VerificationResult::Valid)
    }

    pub fn with_captcha(captcha: VerificationResult) -> Self {
        let store = Arc::new(MemoryStore::new());
        let files = Arc::new(MemoryFileStorage::new());
        let processor = AttachmentProcessor::new(
            files.clone(),
            Arc::new(NoPreview),
            ProcessorConfig::default(),
        );

        let ctx = ServiceContextBuilder::new()
            .store(store)
            .attachment_processor(Arc::new(processor))
            .captcha_verifier(Arc::new(StaticCaptcha(captcha)))
            .jwt_service(Arc::new(JwtService::new("test-secret-key-that-is-long-enough", 900)))
            .build()
            .unwrap();

        Self { ctx, files }
    }

    pub async fn board(&self, label: &str) -> Board {
        self.board_with(label, |_| {}).await
    }

    pub async fn board_with(&self, label: &str, configure: impl FnOnce(&mut BoardSettings)) -> Board {
        let mut board = Board::new(self.ctx.generate_id(), label.to_string(), label.to_uppercase());
        configure(&mut board.settings);
        self.ctx.board_repo().create(&board).await.unwrap();
        board
    }

    pub async fn user(&self, username: &str, role: UserRole) -> User {
        let mut user = User::new(
            self.ctx.generate_id(),
            username.to_string(),
            format!("{username}@example.com"),
        );
        user.set_role(role);
        let hash = self
            .ctx
            .password_service()
            .hash("correct horse battery")
            .await
            .unwrap();
        self.ctx.user_repo().create(&user, &hash).await.unwrap();
        user
    }

    pub fn id(&self) -> Snowflake {
        self.ctx.generate_id()
    }
}

pub fn poster() -> PosterInfo {
    PosterInfo {
        ip: "203.0.113.7".to_string(),
        country_code: Some("NL".to_string()),
    }
}

pub fn reply(body: &str) -> PostForm {
    PostForm {
        body: body.to_string(),
        ..PostForm::default()
    }
}

pub fn sage(body: &str) -> PostForm {
    PostForm {
        sage: true,
        ..reply(body)
    }
}

pub fn thread(subject: &str, body: &str) -> ThreadForm {
    ThreadForm {
        subject: Some(subject.to_string()),
        post: reply(body),
    }
}

pub fn png(width: u32, height: u32) -> Bytes {
    let image = DynamicImage::new_rgb8(width, height);
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    Bytes::from(out.into_inner())
}

pub fn png_upload(name: &str, width: u32, height: u32) -> AttachmentUpload {
    AttachmentUpload::File {
        original_filename: name.to_string(),
        bytes: png(width, height),
    }
}
