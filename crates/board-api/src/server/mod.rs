//! Server setup and initialization
//!
//! Provides the application builder and the server runner.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use board_common::{AppConfig, AppError, JwtService};
use board_core::SnowflakeGenerator;
use board_db::{
    create_pool, run_migrations, PgAttachmentRepository, PgBanRepository, PgBoardRepository,
    PgPostRepository, PgPostingStore, PgThreadRepository, PgUserRepository,
    PgUserTokenRepository,
};
use board_media::{AttachmentProcessor, LocalFileStorage, OEmbedResolver, ProcessorConfig};
use board_service::services::captcha_verifier_from_config;
use board_service::{BanExpiryTask, ServiceContextBuilder, TokenPurgeTask};
use chrono::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, HttpSettings};
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState, settings: &HttpSettings) -> Router {
    let router = create_router();
    let router = apply_middleware(router, settings);
    router.with_state(state)
}

/// Connect to PostgreSQL and wire every service dependency
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let db_config = board_db::DatabaseConfig::new(
        config.database.url.clone(),
        config.database.max_connections,
        config.database.min_connections,
    );
    let pool = create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {e}")))?;
        info!("Database migrations applied");
    }

    let storage = Arc::new(LocalFileStorage::new(&config.storage.upload_dir));
    let embeds = Arc::new(
        OEmbedResolver::new(config.embed.connect_timeout(), config.embed.timeout())
            .map_err(|e| AppError::Config(e.to_string()))?,
    );
    let processor = AttachmentProcessor::new(
        storage,
        embeds,
        ProcessorConfig {
            max_file_size: config.storage.max_file_size_bytes() as u64,
            thumbnail_max_width: config.storage.thumbnail_max_width,
            thumbnail_max_height: config.storage.thumbnail_max_height,
        },
    );

    let captcha = captcha_verifier_from_config(&config.captcha)
        .map_err(|e| AppError::Config(e.to_string()))?;
    if !config.captcha.is_enabled() {
        warn!("Captcha verification disabled; every token is accepted");
    }

    let service_context = ServiceContextBuilder::new()
        .board_repo(Arc::new(PgBoardRepository::new(pool.clone())))
        .thread_repo(Arc::new(PgThreadRepository::new(pool.clone())))
        .post_repo(Arc::new(PgPostRepository::new(pool.clone())))
        .attachment_repo(Arc::new(PgAttachmentRepository::new(pool.clone())))
        .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
        .token_repo(Arc::new(PgUserTokenRepository::new(pool.clone())))
        .ban_repo(Arc::new(PgBanRepository::new(pool.clone())))
        .posting_store(Arc::new(PgPostingStore::new(pool.clone())))
        .attachment_processor(Arc::new(processor))
        .captcha_verifier(captcha)
        .jwt_service(Arc::new(JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry,
        )))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .password_reset_ttl(Duration::minutes(config.tokens.password_reset_ttl_minutes))
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context).with_pool(pool))
}

/// Serve until Ctrl-C
pub async fn run_server(app: Router, addr: &str) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let state = create_app_state(&config).await?;

    let purge = TokenPurgeTask::from_context(state.service_context(), config.tokens.purge_interval())
        .spawn();
    let expiry = BanExpiryTask::from_context(state.service_context(), config.bans.expiry_interval())
        .spawn();

    let app = create_app(state, &HttpSettings::from(&config));
    let result = run_server(app, &config.api.address()).await;

    purge.abort();
    expiry.abort();
    result
}
