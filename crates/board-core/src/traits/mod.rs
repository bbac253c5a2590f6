//! Ports implemented by infrastructure crates

mod captcha;
mod posting;
mod repositories;
mod storage;

pub use captcha::{CaptchaVerifier, VerificationResult};
pub use posting::{PostingStore, PostingTransaction, ThreadActivity};
pub use repositories::{
    AttachmentRepository, BanRepository, BoardRepository, PostRepository, RepoResult, ThreadRepository,
    UserRepository, UserTokenRepository,
};
pub use storage::{FileStorage, StorageResult};
