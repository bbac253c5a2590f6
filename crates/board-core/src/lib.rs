//! # board-core
//!
//! Domain layer of the imageboard: boards, threads, posts, attachments, users, their
//! tokens and IP bans, plus the pure thread bump engine and the ports (repository, storage,
//! captcha) that infrastructure crates implement.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod bump;
pub mod constants;
pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use bump::{BumpDecision, BumpOutcome, ThreadBumpEngine, ThreadState};
pub use entities::{
    Attachment, AttachmentCategory, AttachmentMetadata, AttachmentPayload, Ban, BanStatus, Board,
    BoardSettings,
    EmbedData, Post, Thread, User, UserRole, UserToken, UserTokenType,
};
pub use error::DomainError;
pub use traits::{
    AttachmentRepository, BanRepository, BoardRepository, CaptchaVerifier, FileStorage, PostRepository,
    PostingStore, PostingTransaction, RepoResult, StorageResult, ThreadActivity, ThreadRepository,
    UserRepository, UserTokenRepository, VerificationResult,
};
pub use value_objects::{Authorities, Snowflake, SnowflakeGenerator, SnowflakeParseError};
