//! Dependency probes behind `GET /api/v1/health`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use stockpulse_core::ServiceError;
use stockpulse_search::SearchClient;

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn database(&self) -> Result<(), ServiceError>;
    async fn search(&self) -> Result<(), ServiceError>;
}

/// Probes the live Postgres pool and search cluster.
pub struct LiveHealth {
    pool: PgPool,
    search: Arc<SearchClient>,
}

impl LiveHealth {
    #[must_use]
    pub fn new(pool: PgPool, search: Arc<SearchClient>) -> Self {
        Self { pool, search }
    }
}

#[async_trait]
impl HealthProbe for LiveHealth {
    async fn database(&self) -> Result<(), ServiceError> {
        stockpulse_db::health_check(&self.pool)
            .await
            .map_err(ServiceError::from)
    }

    async fn search(&self) -> Result<(), ServiceError> {
        self.search.ping().await.map_err(ServiceError::from)
    }
}
