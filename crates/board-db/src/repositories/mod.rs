//! Repository implementations

mod attachment;
mod ban;
mod board;
pub mod error;
mod post;
mod posting;
mod queries;
mod thread;
mod user;
mod user_token;

pub use attachment::PgAttachmentRepository;
pub use ban::PgBanRepository;
pub use board::PgBoardRepository;
pub use post::PgPostRepository;
pub use posting::{PgPostingStore, PgPostingTransaction};
pub use thread::PgThreadRepository;
pub use user::PgUserRepository;
pub use user_token::PgUserTokenRepository;
