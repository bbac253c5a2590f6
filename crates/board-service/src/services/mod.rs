//! Business logic services
//!
//! Each service borrows the shared [`ServiceContext`] for the duration of one request.

pub mod access;
pub mod allocator;
pub mod auth;
pub mod ban;
pub mod board;
pub mod captcha;
pub mod context;
pub mod error;
pub mod identity;
pub mod posting;
pub mod user;
pub mod user_token;

#[cfg(test)]
pub(crate) mod test_support;

pub use allocator::PostNumberAllocator;
pub use auth::AuthService;
pub use ban::{BanExpiryTask, BanService};
pub use board::BoardService;
pub use captcha::{captcha_verifier_from_config, DisabledCaptchaVerifier, HcaptchaVerifier};
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use posting::BoardPostingService;
pub use user::UserService;
pub use user_token::{TokenPurgeTask, UserTokenService};
