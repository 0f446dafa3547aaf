//! Stock file ingestion: per-ticker price CSVs to the price table.
//!
//! Input files use the layout written by [`crate::crawler`]: three header
//! rows, then `Date, Close, High, Low, Open, Volume` data rows.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use stockpulse_core::PriceRow;

use crate::error::IngestError;
use crate::news::list_files_with_extension;
use crate::sink::PriceSink;

/// Header rows preceding the data in every price CSV.
pub const HEADER_ROWS: usize = 3;

/// Scale of the price table's `NUMERIC(15, 6)` columns.
const PRICE_SCALE: u32 = 6;

// Data column positions.
const COL_DATE: usize = 0;
const COL_CLOSE: usize = 1;
const COL_HIGH: usize = 2;
const COL_LOW: usize = 3;
const COL_OPEN: usize = 4;
const COL_VOLUME: usize = 5;

/// Rows that survived cleaning, plus how many were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedTable {
    pub rows: Vec<PriceRow>,
    pub dropped: usize,
}

/// Outcome of a directory run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StockIngestSummary {
    pub processed: usize,
    pub failed: usize,
    pub rows_pushed: u64,
}

/// Ticker from a price file name: the text before the first `_`, upper-cased.
///
/// `MSFT_1year_monthly.csv` → `MSFT`.
///
/// # Errors
///
/// Returns [`IngestError::InvalidFileName`] when that text is empty.
pub fn extract_ticker(file_name: &str) -> Result<String, IngestError> {
    let ticker = file_name.split('_').next().unwrap_or_default().trim();
    if ticker.is_empty() {
        return Err(IngestError::InvalidFileName(file_name.to_string()));
    }
    Ok(ticker.to_uppercase())
}

/// Parses and cleans one price table for `ticker`.
///
/// A row with an unparseable or missing date, price, or volume is dropped.
///
/// # Errors
///
/// Returns [`csv::Error`] if the input is not readable as CSV.
pub fn parse_price_csv<R: Read>(reader: R, ticker: &str) -> Result<CleanedTable, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let ticker = ticker.to_uppercase();
    let mut table = CleanedTable::default();

    for record in csv_reader.records().skip(HEADER_ROWS) {
        let record = record?;
        match clean_record(&record, &ticker) {
            Some(row) => table.rows.push(row),
            None => table.dropped += 1,
        }
    }

    Ok(table)
}

fn clean_record(record: &csv::StringRecord, ticker: &str) -> Option<PriceRow> {
    Some(PriceRow {
        ticker: ticker.to_string(),
        date: parse_row_date(record.get(COL_DATE)?)?,
        open: parse_price(record.get(COL_OPEN)?)?,
        high: parse_price(record.get(COL_HIGH)?)?,
        low: parse_price(record.get(COL_LOW)?)?,
        close: parse_price(record.get(COL_CLOSE)?)?,
        volume: parse_volume(record.get(COL_VOLUME)?)?,
    })
}

fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z")
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn parse_price(raw: &str) -> Option<Decimal> {
    parse_decimal(raw).map(|d| d.round_dp(PRICE_SCALE).normalize())
}

/// Integer volume; integral floats such as `1.5e6` are accepted.
fn parse_volume(raw: &str) -> Option<i64> {
    let value = parse_decimal(raw)?;
    if !value.fract().is_zero() {
        return None;
    }
    value.to_i64()
}

/// Reads, cleans, and validates one price file.
///
/// # Errors
///
/// - [`IngestError::Io`] / [`IngestError::Csv`] if the file cannot be read.
/// - [`IngestError::EmptyTable`] if no row survives cleaning.
pub fn process_stock_file(path: &Path, ticker: &str) -> Result<Vec<PriceRow>, IngestError> {
    tracing::info!(path = %path.display(), ticker, "processing file");
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_price_csv(file, ticker).map_err(|source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    if table.dropped > 0 {
        tracing::warn!(
            path = %path.display(),
            dropped = table.dropped,
            "dropped rows with missing values"
        );
    }
    if table.rows.is_empty() {
        return Err(IngestError::EmptyTable(path.to_path_buf()));
    }
    Ok(table.rows)
}

/// Loads every `.csv` file in `dir` into the price sink, in file-name order.
///
/// Files are independent: a bad file name, unreadable or empty file, or a
/// failed push (including a duplicate `(ticker, date)`) is logged and counted
/// in `failed`, and the run moves on.
///
/// # Errors
///
/// Returns [`IngestError::MissingDirectory`] if `dir` does not exist, or
/// [`IngestError::Db`] if the price table cannot be created. Both abort the
/// run before any file is read.
pub async fn ingest_stock_dir<S: PriceSink + ?Sized>(
    sink: &S,
    dir: &Path,
) -> Result<StockIngestSummary, IngestError> {
    tracing::info!(dir = %dir.display(), "starting stock data ingestion");
    let files = list_files_with_extension(dir, "csv")?;
    sink.ensure_table().await?;

    let mut summary = StockIngestSummary::default();
    for path in files {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        let ticker = match extract_ticker(file_name) {
            Ok(ticker) => ticker,
            Err(e) => {
                tracing::warn!(file = file_name, error = %e, "skipping file");
                summary.failed += 1;
                continue;
            }
        };

        let rows = match process_stock_file(&path, &ticker) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(ticker = %ticker, error = %e, "failed to process file");
                summary.failed += 1;
                continue;
            }
        };

        tracing::info!(ticker = %ticker, rows = rows.len(), "pushing rows");
        match sink.push(&rows).await {
            Ok(pushed) => {
                tracing::info!(ticker = %ticker, "pushed data");
                summary.processed += 1;
                summary.rows_pushed += pushed;
            }
            Err(e) => {
                tracing::error!(
                    ticker = %ticker,
                    file = file_name,
                    duplicate = e.is_unique_violation(),
                    error = %e,
                    "failed to push data"
                );
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        processed = summary.processed,
        failed = summary.failed,
        "stock data ingestion finished"
    );
    Ok(summary)
}

#[cfg(test)]
#[path = "stocks_test.rs"]
mod tests;
