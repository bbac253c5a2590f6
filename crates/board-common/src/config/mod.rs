//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BanConfig, CaptchaConfig, ConfigError, CorsConfig, DatabaseConfig,
    EmbedConfig, Environment, JwtConfig, ServerConfig, SnowflakeConfig, StorageConfig,
    TokenConfig,
};
