//! Domain entities - core business objects

mod attachment;
mod ban;
mod board;
mod post;
mod thread;
mod user;
mod user_token;

pub use attachment::{
    thumbnail_path, Attachment, AttachmentCategory, AttachmentMetadata, AttachmentPayload,
    EmbedData,
};
pub use ban::{Ban, BanStatus};
pub use board::{Board, BoardSettings};
pub use post::Post;
pub use thread::Thread;
pub use user::{User, UserRole};
pub use user_token::{UserToken, UserTokenType};
