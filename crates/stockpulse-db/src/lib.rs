use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use stockpulse_core::{AppConfig, ServiceError};
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("table {0} already exists")]
    TableExists(String),
    #[error("result is missing required columns ({})", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DbError {
    /// `true` when the statement hit the `(ticker, date)` uniqueness constraint.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Sqlx(sqlx::Error::Database(db)) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
            _ => false,
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match &err {
            DbError::TableExists(_) | DbError::MissingColumns(_) => {
                ServiceError::ValidationFailure(err.to_string())
            }
            DbError::Sqlx(sqlx::Error::RowNotFound) => ServiceError::NotFound(err.to_string()),
            DbError::Sqlx(
                sqlx::Error::Database(_)
                | sqlx::Error::ColumnNotFound(_)
                | sqlx::Error::ColumnDecode { .. }
                | sqlx::Error::Decode(_)
                | sqlx::Error::TypeNotFound { .. },
            ) => ServiceError::ValidationFailure(err.to_string()),
            DbError::Sqlx(_) => ServiceError::ConnectionFailure(err.to_string()),
        }
    }
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Connect using `DATABASE_URL` and the pool settings from [`AppConfig`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect_pool_from_config(config: &AppConfig) -> Result<PgPool, DbError> {
    let pool = connect_pool(&config.database_url, PoolConfig::from_app_config(config)).await?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "connected to Postgres"
    );
    Ok(pool)
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Run a full health check: ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}

/// Execute a raw DDL/DML statement and return the affected row count.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the statement fails.
pub async fn execute(pool: &PgPool, sql: &str) -> Result<u64, DbError> {
    let result = sqlx::query(sql).execute(pool).await?;
    tracing::debug!(rows_affected = result.rows_affected(), "executed statement");
    Ok(result.rows_affected())
}


pub mod prices;

pub use prices::{
    ensure_price_table, list_prices_since, push_price_table, table_exists, IfExists,
    PRICE_TABLE_COLUMNS,
};
