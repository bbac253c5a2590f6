//! Application configuration
//!
//! Everything is read from environment variables (optionally seeded from a `.env`
//! file). Only `API_PORT`, `DATABASE_URL` and `JWT_SECRET` are required.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub storage: StorageConfig,
    pub embed: EmbedConfig,
    pub captcha: CaptchaConfig,
    pub tokens: TokenConfig,
    pub bans: BanConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Attachment storage
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_max_width: u32,
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_max_height: u32,
}

impl StorageConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb as usize * 1024 * 1024
    }
}

/// Remote embed (oEmbed) lookups
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedConfig {
    #[serde(default = "default_embed_connect_timeout")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_embed_timeout")]
    pub timeout_ms: u64,
}

impl EmbedConfig {
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// hCaptcha settings. Verification is disabled when no secret is set.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptchaConfig {
    pub secret: Option<String>,
    #[serde(default = "default_captcha_verify_url")]
    pub verify_url: String,
    #[serde(default = "default_captcha_timeout")]
    pub timeout_ms: u64,
}

impl CaptchaConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.secret.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// User token lifetimes and the expired-token sweep
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
    #[serde(default = "default_password_reset_ttl")]
    pub password_reset_ttl_minutes: i64,
}

impl TokenConfig {
    #[must_use]
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs.max(1))
    }
}

/// Sweep that marks ended bans as expired
#[derive(Debug, Clone, Deserialize)]
pub struct BanConfig {
    #[serde(default = "default_ban_expiry_interval")]
    pub expiry_interval_secs: u64,
}

impl BanConfig {
    #[must_use]
    pub fn expiry_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "board-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

fn default_access_token_expiry() -> i64 {
    3600 // 1 hour
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_max_file_size() -> u32 {
    10
}

fn default_thumbnail_size() -> u32 {
    250
}

fn default_embed_connect_timeout() -> u64 {
    2_000
}

fn default_embed_timeout() -> u64 {
    5_000
}

fn default_captcha_verify_url() -> String {
    "https://hcaptcha.com/siteverify".to_string()
}

fn default_captcha_timeout() -> u64 {
    5_000
}

fn default_purge_interval() -> u64 {
    900 // 15 minutes
}

fn default_password_reset_ttl() -> i64 {
    30
}

fn default_ban_expiry_interval() -> u64 {
    60
}

/// Parse an optional variable; unparsable values fall back to the default.
fn var_or<T: FromStr>(key: &str, default: impl FnOnce() -> T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(default)
}

fn required_var(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ConfigError::MissingVar(key))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let env = match env::var("APP_ENV") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::default(),
        };

        let port = required_var("API_PORT")?;
        let port = port
            .parse()
            .map_err(|_| ConfigError::InvalidValue("API_PORT", port))?;

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env,
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port,
            },
            database: DatabaseConfig {
                url: required_var("DATABASE_URL")?,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", default_max_connections),
                min_connections: var_or("DATABASE_MIN_CONNECTIONS", default_min_connections),
                run_migrations: var_or("DATABASE_RUN_MIGRATIONS", default_true),
            },
            jwt: JwtConfig {
                secret: required_var("JWT_SECRET")?,
                access_token_expiry: var_or("JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| default_upload_dir()),
                max_file_size_mb: var_or("MAX_FILE_SIZE_MB", default_max_file_size),
                thumbnail_max_width: var_or("THUMBNAIL_MAX_WIDTH", default_thumbnail_size),
                thumbnail_max_height: var_or("THUMBNAIL_MAX_HEIGHT", default_thumbnail_size),
            },
            embed: EmbedConfig {
                connect_timeout_ms: var_or("EMBED_CONNECT_TIMEOUT_MS", default_embed_connect_timeout),
                timeout_ms: var_or("EMBED_TIMEOUT_MS", default_embed_timeout),
            },
            captcha: CaptchaConfig {
                secret: env::var("CAPTCHA_SECRET").ok().filter(|s| !s.is_empty()),
                verify_url: env::var("CAPTCHA_VERIFY_URL")
                    .unwrap_or_else(|_| default_captcha_verify_url()),
                timeout_ms: var_or("CAPTCHA_TIMEOUT_MS", default_captcha_timeout),
            },
            tokens: TokenConfig {
                purge_interval_secs: var_or("TOKEN_PURGE_INTERVAL_SECS", default_purge_interval),
                password_reset_ttl_minutes: var_or(
                    "PASSWORD_RESET_TTL_MINUTES",
                    default_password_reset_ttl,
                ),
            },
            bans: BanConfig {
                expiry_interval_secs: var_or("BAN_EXPIRY_INTERVAL_SECS", default_ban_expiry_interval),
            },
            snowflake: SnowflakeConfig {
                worker_id: var_or("WORKER_ID", || 0),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
