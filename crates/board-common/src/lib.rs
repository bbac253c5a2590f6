//! # board-common
//!
//! Shared utilities including configuration, error handling, authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{hash_password, verify_password, AccessToken, Claims, JwtService, PasswordService};
pub use config::{
    AppConfig, AppSettings, BanConfig, CaptchaConfig, ConfigError, CorsConfig, DatabaseConfig,
    EmbedConfig, Environment, JwtConfig, ServerConfig, SnowflakeConfig, StorageConfig,
    TokenConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{
    try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError,
};
