//! Service context - dependency container for services
//!
//! Holds the repositories, the posting store, the attachment processor, and the auth
//! helpers every service needs.

use std::sync::Arc;

use board_common::{JwtService, PasswordService};
use board_core::traits::{
    AttachmentRepository, BanRepository, BoardRepository, CaptchaVerifier, PostRepository, PostingStore,
    ThreadRepository, UserRepository, UserTokenRepository,
};
use board_core::{Snowflake, SnowflakeGenerator, UserTokenType};
use board_media::AttachmentProcessor;
use chrono::Duration;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Cheap to clone; every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    board_repo: Arc<dyn BoardRepository>,
    thread_repo: Arc<dyn ThreadRepository>,
    post_repo: Arc<dyn PostRepository>,
    attachment_repo: Arc<dyn AttachmentRepository>,
    user_repo: Arc<dyn UserRepository>,
    token_repo: Arc<dyn UserTokenRepository>,
    ban_repo: Arc<dyn BanRepository>,

    // Posting unit of work
    posting_store: Arc<dyn PostingStore>,

    // Collaborators
    attachment_processor: Arc<AttachmentProcessor>,
    captcha_verifier: Arc<dyn CaptchaVerifier>,

    // Services
    jwt_service: Arc<JwtService>,
    password_service: PasswordService,
    snowflake_generator: Arc<SnowflakeGenerator>,
    password_reset_ttl: Duration,
}

impl ServiceContext {
    // === Repositories ===

    pub fn board_repo(&self) -> &dyn BoardRepository {
        self.board_repo.as_ref()
    }

    pub fn thread_repo(&self) -> &dyn ThreadRepository {
        self.thread_repo.as_ref()
    }

    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    pub fn attachment_repo(&self) -> &dyn AttachmentRepository {
        self.attachment_repo.as_ref()
    }

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn token_repo(&self) -> &dyn UserTokenRepository {
        self.token_repo.as_ref()
    }

    /// Shared handle to the token repository, for the background purge task
    pub fn token_repo_handle(&self) -> Arc<dyn UserTokenRepository> {
        Arc::clone(&self.token_repo)
    }

    pub fn ban_repo(&self) -> &dyn BanRepository {
        self.ban_repo.as_ref()
    }

    /// Shared handle to the ban repository, for the background expiry task
    pub fn ban_repo_handle(&self) -> Arc<dyn BanRepository> {
        Arc::clone(&self.ban_repo)
    }

    // === Posting ===

    pub fn posting_store(&self) -> &dyn PostingStore {
        self.posting_store.as_ref()
    }

    pub fn attachment_processor(&self) -> &AttachmentProcessor {
        self.attachment_processor.as_ref()
    }

    pub fn captcha_verifier(&self) -> &dyn CaptchaVerifier {
        self.captcha_verifier.as_ref()
    }

    // === Services ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    pub fn snowflake_generator(&self) -> &SnowflakeGenerator {
        self.snowflake_generator.as_ref()
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    /// Lifetime of password reset tokens
    pub fn password_reset_ttl(&self) -> Duration {
        self.password_reset_ttl
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("snowflake_generator", &self.snowflake_generator)
            .field("password_reset_ttl", &self.password_reset_ttl)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    board_repo: Option<Arc<dyn BoardRepository>>,
    thread_repo: Option<Arc<dyn ThreadRepository>>,
    post_repo: Option<Arc<dyn PostRepository>>,
    attachment_repo: Option<Arc<dyn AttachmentRepository>>,
    user_repo: Option<Arc<dyn UserRepository>>,
    token_repo: Option<Arc<dyn UserTokenRepository>>,
    ban_repo: Option<Arc<dyn BanRepository>>,
    posting_store: Option<Arc<dyn PostingStore>>,
    attachment_processor: Option<Arc<AttachmentProcessor>>,
    captcha_verifier: Option<Arc<dyn CaptchaVerifier>>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    password_reset_ttl: Duration,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            board_repo: None,
            thread_repo: None,
            post_repo: None,
            attachment_repo: None,
            user_repo: None,
            token_repo: None,
            ban_repo: None,
            posting_store: None,
            attachment_processor: None,
            captcha_verifier: None,
            jwt_service: None,
            snowflake_generator: None,
            password_reset_ttl: UserTokenType::PasswordReset.default_ttl(),
        }
    }

    /// Use one store for every repository and the posting unit of work
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: BoardRepository
            + ThreadRepository
            + PostRepository
            + AttachmentRepository
            + UserRepository
            + UserTokenRepository
            + BanRepository
            + PostingStore
            + 'static,
    {
        self.board_repo(store.clone())
            .thread_repo(store.clone())
            .post_repo(store.clone())
            .attachment_repo(store.clone())
            .user_repo(store.clone())
            .token_repo(store.clone())
            .ban_repo(store.clone())
            .posting_store(store)
    }

    pub fn board_repo(mut self, repo: Arc<dyn BoardRepository>) -> Self {
        self.board_repo = Some(repo);
        self
    }

    pub fn thread_repo(mut self, repo: Arc<dyn ThreadRepository>) -> Self {
        self.thread_repo = Some(repo);
        self
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn attachment_repo(mut self, repo: Arc<dyn AttachmentRepository>) -> Self {
        self.attachment_repo = Some(repo);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn token_repo(mut self, repo: Arc<dyn UserTokenRepository>) -> Self {
        self.token_repo = Some(repo);
        self
    }

    pub fn ban_repo(mut self, repo: Arc<dyn BanRepository>) -> Self {
        self.ban_repo = Some(repo);
        self
    }

    pub fn posting_store(mut self, store: Arc<dyn PostingStore>) -> Self {
        self.posting_store = Some(store);
        self
    }

    pub fn attachment_processor(mut self, processor: Arc<AttachmentProcessor>) -> Self {
        self.attachment_processor = Some(processor);
        self
    }

    pub fn captcha_verifier(mut self, verifier: Arc<dyn CaptchaVerifier>) -> Self {
        self.captcha_verifier = Some(verifier);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn password_reset_ttl(mut self, ttl: Duration) -> Self {
        self.password_reset_ttl = ttl;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
        }

        Ok(ServiceContext {
            board_repo: required(self.board_repo, "board_repo")?,
            thread_repo: required(self.thread_repo, "thread_repo")?,
            post_repo: required(self.post_repo, "post_repo")?,
            attachment_repo: required(self.attachment_repo, "attachment_repo")?,
            user_repo: required(self.user_repo, "user_repo")?,
            token_repo: required(self.token_repo, "token_repo")?,
            ban_repo: required(self.ban_repo, "ban_repo")?,
            posting_store: required(self.posting_store, "posting_store")?,
            attachment_processor: required(self.attachment_processor, "attachment_processor")?,
            captcha_verifier: required(self.captcha_verifier, "captcha_verifier")?,
            jwt_service: required(self.jwt_service, "jwt_service")?,
            password_service: PasswordService::new(),
            snowflake_generator: self
                .snowflake_generator
                .unwrap_or_else(|| Arc::new(SnowflakeGenerator::default())),
            password_reset_ttl: self.password_reset_ttl,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
