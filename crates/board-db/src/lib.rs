//! # board-db
//!
//! Persistence for the repository and posting-store traits defined in `board-core`.
//!
//! ## Overview
//!
//! - Connection pool management and embedded migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repositories and the transactional posting store
//! - An in-memory store implementing the same traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use board_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use board_db::repositories::PgBoardRepository;
//! use board_core::traits::BoardRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     run_migrations(&pool).await?;
//!     let boards = PgBoardRepository::new(pool);
//!     let next = boards.increase_post_number("fit").await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgAttachmentRepository, PgBanRepository, PgBoardRepository, PgPostRepository, PgPostingStore,
    PgThreadRepository, PgUserRepository, PgUserTokenRepository,
};
