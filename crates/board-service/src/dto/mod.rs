//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs and posting forms with validation
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AttachmentUpload, BoardSettingsRequest, CreateBanRequest, CreateBoardRequest,
    CreateUserRequest, DeletePostRequest, ForgotPasswordRequest, LoginRequest, PostForm,
    PosterInfo, ResetPasswordRequest, ThreadForm, ToggleRequest, UnbanRequest, UpdateBanRequest,
    UpdateBoardRequest, UpdateCurrentUserRequest, UpdateUserRequest,
};

pub use responses::{
    AttachmentMetadataResponse, AttachmentResponse, BanResponse, BoardResponse,
    BoardSettingsResponse, EmbedResponse, HealthChecks, HealthResponse, LoginResponse, PostCreatedResponse, PostResponse,
    ReadinessResponse, ThreadPageResponse, ThreadResponse, ThreadSummaryResponse, UserResponse,
};
