//! Database operations for the price table.
//!
//! The table name is configurable, so it is interpolated into statement text
//! as a [`SqlIdentifier`]; every value is a bound parameter.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use stockpulse_core::{PricePoint, PriceRow, SqlIdentifier, PRICE_FRAME_COLUMNS};

use crate::DbError;

/// Column order used for inserts.
pub const PRICE_TABLE_COLUMNS: [&str; 7] =
    ["ticker", "date", "open", "high", "low", "close", "volume"];

/// Postgres accepts at most this many bind parameters per statement.
const MAX_BIND_PARAMS: usize = 65_535;

/// What [`push_price_table`] does when the target table already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfExists {
    /// Refuse to write.
    Fail,
    /// Drop and recreate the table before inserting.
    Replace,
    /// Insert into the existing table.
    #[default]
    Append,
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

/// Returns whether `table` exists in the current schema.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the catalog query fails.
pub async fn table_exists(pool: &PgPool, table: &SqlIdentifier) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
             SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = lower($1) \
         )",
    )
    .bind(table.as_str())
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Creates the price table if it does not exist yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the DDL fails. Callers treat this as fatal
/// for the run.
pub async fn ensure_price_table(pool: &PgPool, table: &SqlIdentifier) -> Result<(), DbError> {
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {table} ( \
             ticker VARCHAR(10) NOT NULL, \
             date   DATE NOT NULL, \
             open   NUMERIC(15, 6), \
             high   NUMERIC(15, 6), \
             low    NUMERIC(15, 6), \
             close  NUMERIC(15, 6), \
             volume BIGINT, \
             PRIMARY KEY (ticker, date) \
         )"
    );
    sqlx::query(&ddl).execute(pool).await?;
    tracing::info!(table = %table, "price table is ready");
    Ok(())
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Inserts `rows` into `table` in chunks of at most `chunk_size` rows.
///
/// Each chunk is one multi-row `INSERT` in its own transaction, so a failing
/// chunk leaves earlier chunks committed. An empty slice is a no-op that never
/// touches the database. Returns the number of rows inserted.
///
/// # Errors
///
/// - [`DbError::TableExists`] with [`IfExists::Fail`] when the table exists.
/// - [`DbError::Sqlx`] on any statement failure, including a duplicate
///   `(ticker, date)` (see [`DbError::is_unique_violation`]).
pub async fn push_price_table(
    pool: &PgPool,
    table: &SqlIdentifier,
    rows: &[PriceRow],
    if_exists: IfExists,
    chunk_size: usize,
) -> Result<u64, DbError> {
    if rows.is_empty() {
        tracing::debug!(table = %table, "no rows to push");
        return Ok(0);
    }

    match if_exists {
        IfExists::Fail => {
            if table_exists(pool, table).await? {
                return Err(DbError::TableExists(table.to_string()));
            }
        }
        IfExists::Replace => {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(pool)
                .await?;
        }
        IfExists::Append => {}
    }
    ensure_price_table(pool, table).await?;

    let max_rows = MAX_BIND_PARAMS / PRICE_TABLE_COLUMNS.len();
    let chunk_size = chunk_size.clamp(1, max_rows);
    let insert_prefix = format!(
        "INSERT INTO {table} ({}) ",
        PRICE_TABLE_COLUMNS.join(", ")
    );

    let mut inserted = 0u64;
    for chunk in rows.chunks(chunk_size) {
        let mut tx = pool.begin().await?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(&insert_prefix);
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.ticker.as_str())
                .push_bind(row.date)
                .push_bind(row.open)
                .push_bind(row.high)
                .push_bind(row.low)
                .push_bind(row.close)
                .push_bind(row.volume);
        });
        let result = builder.build().execute(&mut *tx).await?;

        tx.commit().await?;
        inserted += result.rows_affected();
    }

    tracing::info!(table = %table, rows = inserted, "pushed price rows");
    Ok(inserted)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Frame columns absent from `present`, compared case-insensitively, in
/// frame order.
pub(crate) fn missing_columns(present: &[String]) -> Vec<String> {
    PRICE_FRAME_COLUMNS
        .iter()
        .filter(|col| !present.iter().any(|p| p.eq_ignore_ascii_case(col)))
        .map(|col| (*col).to_string())
        .collect()
}

/// Returns `ticker`'s bars dated on or after `since`, ordered by date ascending.
///
/// `ticker` is upper-cased before matching. The table's columns are checked
/// against the catalog first, so a table that lacks a frame column is reported
/// as such instead of as a generic query error.
///
/// # Errors
///
/// - [`DbError::MissingColumns`] if the table exists but lacks any of the
///   frame columns.
/// - [`DbError::Sqlx`] if the query or decoding fails, including when the
///   table does not exist.
pub async fn list_prices_since(
    pool: &PgPool,
    table: &SqlIdentifier,
    ticker: &str,
    since: NaiveDate,
) -> Result<Vec<PricePoint>, DbError> {
    let present = sqlx::query_scalar::<_, String>(
        "SELECT column_name::text FROM information_schema.columns \
         WHERE table_schema = current_schema() AND table_name = lower($1)",
    )
    .bind(table.as_str())
    .fetch_all(pool)
    .await?;

    if !present.is_empty() {
        let missing = missing_columns(&present);
        if !missing.is_empty() {
            return Err(DbError::MissingColumns(missing));
        }
    }

    let sql = format!(
        "SELECT date, open, high, low, close, volume \
         FROM {table} \
         WHERE ticker = $1 AND date >= $2 \
         ORDER BY date ASC"
    );
    let rows = sqlx::query(&sql)
        .bind(ticker.to_uppercase())
        .bind(since)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<PricePoint, DbError> {
            Ok(PricePoint {
                date: row.try_get("date")?,
                open: row.try_get("open")?,
                high: row.try_get("high")?,
                low: row.try_get("low")?,
                close: row.try_get("close")?,
                volume: row.try_get("volume")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    fn row(day: u32) -> PriceRow {
        PriceRow {
            ticker: "MSFT".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: Decimal::new(40_000, 2),
            high: Decimal::new(41_000, 2),
            low: Decimal::new(39_500, 2),
            close: Decimal::new(40_550, 2),
            volume: 1_200_000,
        }
    }

    #[test]
    fn if_exists_defaults_to_append() {
        assert_eq!(IfExists::default(), IfExists::Append);
    }

    #[test]
    fn insert_columns_cover_every_row_field() {
        let row = row(1);
        assert_eq!(PRICE_TABLE_COLUMNS.len(), 7);
        assert_eq!(&PRICE_TABLE_COLUMNS[1..], &PRICE_FRAME_COLUMNS[..]);
        assert_eq!(row.point().date, row.date);
    }

    #[test]
    fn missing_columns_ignores_case_and_extras() {
        let present: Vec<String> = ["ticker", "Date", "OPEN", "high", "low", "close", "note"]
            .iter()
            .map(|c| (*c).to_string())
            .collect();
        assert_eq!(missing_columns(&present), vec!["volume".to_string()]);

        let full: Vec<String> = PRICE_FRAME_COLUMNS.iter().map(|c| (*c).to_string()).collect();
        assert!(missing_columns(&full).is_empty());
    }

    #[tokio::test]
    async fn push_empty_rows_never_touches_the_database() {
        // Lazy pool pointing nowhere: any query would fail to connect.
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(50))
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let table = SqlIdentifier::parse("stock_prices").unwrap();

        let inserted = push_price_table(&pool, &table, &[], IfExists::Fail, 1000)
            .await
            .unwrap();
        assert_eq!(inserted, 0);
    }
}
