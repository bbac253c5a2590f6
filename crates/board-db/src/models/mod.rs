//! Database models - SQLx-compatible structs for PostgreSQL tables

mod ban;
mod board;
mod post;
mod thread;
mod user;
mod user_token;

pub use ban::BanModel;
pub use board::BoardModel;
pub use post::PostModel;
pub use thread::ThreadModel;
pub use user::UserModel;
pub use user_token::UserTokenModel;
