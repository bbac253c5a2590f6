//! # board-service
//!
//! Application layer: posting, numbering, board and account management, IP bans, and the
//! DTOs the HTTP layer exchanges with clients.

pub mod dto;
pub mod services;

pub use services::{
    AuthService, BanExpiryTask, BanService, BoardPostingService, BoardService,
    PostNumberAllocator, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    TokenPurgeTask, UserService, UserTokenService,
};
