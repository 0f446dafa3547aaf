//! Write-side seams for the pipelines.

use async_trait::async_trait;
use sqlx::PgPool;
use stockpulse_core::{NewsDocument, PriceRow, SqlIdentifier};
use stockpulse_db::{DbError, IfExists};
use stockpulse_search::{BulkSummary, SearchClient};

/// Bulk destination for normalized articles.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Submit `documents` to `index` in one bulk operation. Failures are
    /// reported in the summary, never raised.
    async fn submit(&self, index: &str, documents: &[NewsDocument]) -> BulkSummary;
}

/// Destination for cleaned price rows.
#[async_trait]
pub trait PriceSink: Send + Sync {
    /// Make sure the destination table exists.
    async fn ensure_table(&self) -> Result<(), DbError>;

    /// Append `rows`; returns how many were written.
    async fn push(&self, rows: &[PriceRow]) -> Result<u64, DbError>;
}

#[async_trait]
impl DocumentSink for SearchClient {
    async fn submit(&self, index: &str, documents: &[NewsDocument]) -> BulkSummary {
        self.bulk_index(index, documents, None).await
    }
}

/// The Postgres price table.
pub struct PgPriceSink {
    pool: PgPool,
    table: SqlIdentifier,
    chunk_size: usize,
}

impl PgPriceSink {
    #[must_use]
    pub fn new(pool: PgPool, table: SqlIdentifier, chunk_size: usize) -> Self {
        Self {
            pool,
            table,
            chunk_size,
        }
    }
}

#[async_trait]
impl PriceSink for PgPriceSink {
    async fn ensure_table(&self) -> Result<(), DbError> {
        stockpulse_db::ensure_price_table(&self.pool, &self.table).await
    }

    async fn push(&self, rows: &[PriceRow]) -> Result<u64, DbError> {
        stockpulse_db::push_price_table(
            &self.pool,
            &self.table,
            rows,
            IfExists::Append,
            self.chunk_size,
        )
        .await
    }
}

/// Logs what would be written and writes nothing. Everything "succeeds".
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunSink;

#[async_trait]
impl DocumentSink for DryRunSink {
    async fn submit(&self, index: &str, documents: &[NewsDocument]) -> BulkSummary {
        tracing::info!(index, documents = documents.len(), "[dry-run] would bulk index");
        for doc in documents {
            tracing::debug!(
                company = %doc.company,
                publish_date = %doc.publish_date,
                title = %doc.display_title(),
                "[dry-run] document"
            );
        }
        BulkSummary {
            succeeded: documents.len(),
            ..BulkSummary::default()
        }
    }
}

#[async_trait]
impl PriceSink for DryRunSink {
    async fn ensure_table(&self) -> Result<(), DbError> {
        tracing::info!("[dry-run] would ensure price table");
        Ok(())
    }

    async fn push(&self, rows: &[PriceRow]) -> Result<u64, DbError> {
        let ticker = rows.first().map_or("", |r| r.ticker.as_str());
        tracing::info!(ticker, rows = rows.len(), "[dry-run] would push price rows");
        Ok(rows.len() as u64)
    }
}
