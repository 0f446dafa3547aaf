//! Price history crawler for the Yahoo Finance chart API.
//!
//! Writes one CSV per ticker in the three-header-row layout that
//! [`crate::stocks`] reads back.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use stockpulse_core::PriceRow;

use crate::error::IngestError;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Columns after `Date`, in file order.
const VALUE_COLUMNS: [&str; 5] = ["Close", "High", "Low", "Open", "Volume"];

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the chart endpoint.
pub struct PriceCrawler {
    client: Client,
    base_url: String,
}

impl PriceCrawler {
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64) -> Result<Self, IngestError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs)
    }

    /// Client against a custom base URL (a `wiremock` server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; stockpulse/0.1)")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Downloads `ticker` bars from `start` (inclusive) to `end` (exclusive)
    /// at `interval` (`1d`, `1wk`, `1mo`, ...).
    ///
    /// Bars with any missing value are left out.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Http`] on network failure.
    /// - [`IngestError::UnexpectedStatus`] on a non-2xx answer without a
    ///   chart error body.
    /// - [`IngestError::History`] when the API reports an error or returns
    ///   no series.
    pub async fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: &str,
    ) -> Result<Vec<PriceRow>, IngestError> {
        let ticker = ticker.trim().to_uppercase();
        let url = format!("{}/v8/finance/chart/{ticker}", self.base_url);
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let period2 = end.and_time(NaiveTime::MIN).and_utc().timestamp();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", interval.to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let envelope: Option<ChartEnvelope> = serde_json::from_str(&body).ok();

        if let Some(err) = envelope.as_ref().and_then(|e| e.chart.error.as_ref()) {
            return Err(IngestError::History {
                ticker,
                reason: format!("{}: {}", err.code, err.description),
            });
        }
        if !status.is_success() {
            return Err(IngestError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let result = envelope
            .and_then(|e| e.chart.result)
            .and_then(|mut results| (!results.is_empty()).then(|| results.swap_remove(0)))
            .ok_or_else(|| IngestError::History {
                ticker: ticker.clone(),
                reason: "response contained no chart result".to_string(),
            })?;

        let rows = rows_from_chart(&ticker, result);
        tracing::info!(ticker = %ticker, rows = rows.len(), interval, "downloaded price history");
        Ok(rows)
    }
}

fn rows_from_chart(ticker: &str, result: ChartResult) -> Vec<PriceRow> {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let value = |series: &[Option<f64>], i: usize| {
        series
            .get(i)
            .copied()
            .flatten()
            .and_then(Decimal::from_f64)
            .map(|d| d.round_dp(6))
    };

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            Some(PriceRow {
                ticker: ticker.to_string(),
                date: DateTime::from_timestamp(*ts, 0)?.date_naive(),
                open: value(&quote.open, i)?,
                high: value(&quote.high, i)?,
                low: value(&quote.low, i)?,
                close: value(&quote.close, i)?,
                volume: quote.volume.get(i).copied().flatten()?,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

/// `MSFT` → `MSFT_1year_monthly.csv`.
#[must_use]
pub fn price_csv_file_name(ticker: &str) -> String {
    format!("{}_1year_monthly.csv", ticker.trim().to_uppercase())
}

/// Writes `rows` for `ticker` as a price CSV: three header rows, then
/// `Date, Close, High, Low, Open, Volume`.
///
/// # Errors
///
/// Returns [`csv::Error`] if writing fails.
pub fn write_price_csv<W: Write>(
    writer: W,
    ticker: &str,
    rows: &[PriceRow],
) -> Result<(), csv::Error> {
    let ticker = ticker.to_uppercase();
    let mut out = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    out.write_record(std::iter::once("Price").chain(VALUE_COLUMNS))?;
    out.write_record(
        std::iter::once("Ticker".to_string())
            .chain(VALUE_COLUMNS.iter().map(|_| ticker.clone())),
    )?;
    out.write_record(std::iter::once("Date").chain(VALUE_COLUMNS.iter().map(|_| "")))?;

    for row in rows {
        out.write_record([
            row.date.format("%Y-%m-%d").to_string(),
            row.close.to_string(),
            row.high.to_string(),
            row.low.to_string(),
            row.open.to_string(),
            row.volume.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Outcome of a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

/// Downloads each ticker and writes its CSV into `out_dir`.
///
/// A ticker that fails to download or write is logged and counted; the crawl
/// continues. With `dry_run` nothing is written.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if `out_dir` cannot be created.
pub async fn crawl_to_dir(
    crawler: &PriceCrawler,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    interval: &str,
    out_dir: &Path,
    dry_run: bool,
) -> Result<CrawlSummary, IngestError> {
    if !dry_run {
        std::fs::create_dir_all(out_dir).map_err(|source| IngestError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;
    }

    let mut summary = CrawlSummary::default();
    for ticker in tickers {
        let rows = match crawler.fetch_history(ticker, start, end, interval).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(ticker = %ticker, error = %e, "failed to download price history");
                summary.failed += 1;
                continue;
            }
        };

        let path = out_dir.join(price_csv_file_name(ticker));
        if dry_run {
            tracing::info!(ticker = %ticker, rows = rows.len(), path = %path.display(), "[dry-run] would write");
            continue;
        }

        let written = std::fs::File::create(&path)
            .map_err(csv::Error::from)
            .and_then(|file| write_price_csv(file, ticker, &rows));
        match written {
            Ok(()) => {
                tracing::info!(ticker = %ticker, path = %path.display(), "saved price history");
                summary.written.push(path);
            }
            Err(e) => {
                tracing::error!(ticker = %ticker, path = %path.display(), error = %e, "failed to write CSV");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
