//! Application state
//!
//! Holds the shared service context and, when running against PostgreSQL, the pool used
//! by the readiness probe.

use std::sync::Arc;

use board_db::PgPool;
use board_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    pool: Option<PgPool>,
}

impl AppState {
    pub fn new(service_context: ServiceContext) -> Self {
        Self {
            service_context: Arc::new(service_context),
            pool: None,
        }
    }

    /// Attach the database pool checked by `/health/ready`
    #[must_use]
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Whether the backing store can serve requests. In-memory stores always can.
    pub async fn database_ready(&self) -> bool {
        match &self.pool {
            Some(pool) => pool.acquire().await.is_ok(),
            None => true,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("pool", &self.pool.is_some())
            .finish()
    }
}
