//! Read-side seams the tools query through.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use stockpulse_core::{PricePoint, ServiceError, SqlIdentifier};
use stockpulse_db::DbError;
use stockpulse_search::{SearchClient, SearchHit};

/// Full-text search over the article index.
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search_news(
        &self,
        query: &serde_json::Value,
        size: usize,
    ) -> Result<Vec<SearchHit>, ServiceError>;
}

/// Price history lookups.
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// Bars for `ticker` dated on or after `since`, oldest first.
    async fn prices_since(&self, ticker: &str, since: NaiveDate)
        -> Result<Vec<PricePoint>, DbError>;
}

/// [`NewsSearch`] against an Elasticsearch index.
pub struct SearchIndex {
    client: Arc<SearchClient>,
    index: String,
}

impl SearchIndex {
    #[must_use]
    pub fn new(client: Arc<SearchClient>, index: impl Into<String>) -> Self {
        Self {
            client,
            index: index.into(),
        }
    }
}

#[async_trait]
impl NewsSearch for SearchIndex {
    async fn search_news(
        &self,
        query: &serde_json::Value,
        size: usize,
    ) -> Result<Vec<SearchHit>, ServiceError> {
        self.client
            .search(&self.index, query, size)
            .await
            .map_err(ServiceError::from)
    }
}

/// [`PriceHistory`] against the Postgres price table.
pub struct PriceTable {
    pool: PgPool,
    table: SqlIdentifier,
}

impl PriceTable {
    #[must_use]
    pub fn new(pool: PgPool, table: SqlIdentifier) -> Self {
        Self { pool, table }
    }
}

#[async_trait]
impl PriceHistory for PriceTable {
    async fn prices_since(
        &self,
        ticker: &str,
        since: NaiveDate,
    ) -> Result<Vec<PricePoint>, DbError> {
        stockpulse_db::list_prices_since(&self.pool, &self.table, ticker, since).await
    }
}
