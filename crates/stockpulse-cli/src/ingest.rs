//! Ingestion command handlers for the CLI.
//!
//! Client handles are built here once per run and passed into the pipelines.
//! With `--dry-run` the pipelines run against [`DryRunSink`], which logs what
//! would be written.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Subcommand;
use stockpulse_core::{AppConfig, SqlIdentifier};
use stockpulse_ingest::{
    crawl_to_dir, ingest_news_dir, ingest_stock_dir, DryRunSink, PgPriceSink, PriceCrawler,
};
use stockpulse_nlp::TranslationClient;
use stockpulse_search::SearchClient;

/// Sub-commands available under `ingest`.
#[derive(Debug, Subcommand)]
pub enum IngestCommands {
    /// Translate article JSON files and bulk index them
    News {
        /// Directory of `*.json` article files; defaults to `STOCKPULSE_NEWS_DATA_DIR`
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Target index; defaults to `ARTICLE_INDEX_NAME`
        #[arg(long)]
        index: Option<String>,
        /// Build documents without indexing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Clean price CSV files and append them to the price table
    Stocks {
        /// Directory of `*.csv` price files; defaults to `STOCKPULSE_STOCK_DATA_DIR`
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Target table; defaults to `PRICE_TABLE_NAME`
        #[arg(long)]
        table: Option<String>,
        /// Clean files without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
}

pub(crate) async fn run(config: &AppConfig, command: IngestCommands) -> anyhow::Result<()> {
    match command {
        IngestCommands::News {
            dir,
            index,
            dry_run,
        } => {
            let dir = dir.unwrap_or_else(|| config.news_data_dir.clone());
            let index = index.unwrap_or_else(|| config.article_index.clone());
            run_ingest_news(config, &dir, &index, dry_run).await
        }
        IngestCommands::Stocks {
            dir,
            table,
            dry_run,
        } => {
            let dir = dir.unwrap_or_else(|| config.stock_data_dir.clone());
            let table = SqlIdentifier::parse(table.as_deref().unwrap_or(&config.price_table))?;
            run_ingest_stocks(config, &dir, table, dry_run).await
        }
    }
}

/// Run the article pipeline over every file in `dir`.
///
/// # Errors
///
/// Returns an error if the search cluster is unreachable, the translation
/// endpoint is malformed, or `dir` cannot be listed. Per-file and per-record
/// failures are logged and counted, not propagated.
async fn run_ingest_news(
    config: &AppConfig,
    dir: &Path,
    index: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let translator = match config.translation_url.as_deref() {
        Some(url) => Some(TranslationClient::new(
            url,
            config.inference_api_token.as_deref(),
            config.request_timeout_secs,
        )?),
        None => {
            tracing::warn!("TRANSLATION_URL not set; documents will carry no English fields");
            None
        }
    };

    let summary = if dry_run {
        ingest_news_dir(&translator, &DryRunSink, index, dir).await?
    } else {
        let client = SearchClient::from_app_config(config)?;
        client.ping().await?;
        ingest_news_dir(&translator, &client, index, dir).await?
    };

    println!(
        "news ingest{}: {} files ({} failed), {} records loaded, {} skipped, {} indexed, {} failed",
        if dry_run { " (dry-run)" } else { "" },
        summary.files,
        summary.files_failed,
        summary.loaded,
        summary.skipped,
        summary.succeeded,
        summary.failed,
    );
    Ok(())
}

/// Run the price pipeline over every file in `dir`.
///
/// # Errors
///
/// Returns an error if the database is unreachable, the table cannot be
/// created, or `dir` cannot be listed.
async fn run_ingest_stocks(
    config: &AppConfig,
    dir: &Path,
    table: SqlIdentifier,
    dry_run: bool,
) -> anyhow::Result<()> {
    let summary = if dry_run {
        ingest_stock_dir(&DryRunSink, dir).await?
    } else {
        let pool = stockpulse_db::connect_pool_from_config(config).await?;
        let sink = PgPriceSink::new(pool, table, config.insert_chunk_size);
        ingest_stock_dir(&sink, dir).await?
    };

    println!(
        "stock ingest{}: {} files processed, {} failed, {} rows pushed",
        if dry_run { " (dry-run)" } else { "" },
        summary.processed,
        summary.failed,
        summary.rows_pushed,
    );
    Ok(())
}

/// Download price history for `tickers` into `out_dir`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or `out_dir` cannot be
/// created.
pub(crate) async fn run_fetch_prices(
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    interval: &str,
    out_dir: &Path,
    timeout_secs: u64,
    dry_run: bool,
) -> anyhow::Result<()> {
    if end < start {
        anyhow::bail!("--end ({end}) is before --start ({start})");
    }
    let crawler = PriceCrawler::new(timeout_secs)?;
    let summary = crawl_to_dir(&crawler, tickers, start, end, interval, out_dir, dry_run).await?;

    for path in &summary.written {
        println!("wrote {}", path.display());
    }
    println!(
        "fetch-prices{}: {} tickers, {} written, {} failed",
        if dry_run { " (dry-run)" } else { "" },
        tickers.len(),
        summary.written.len(),
        summary.failed,
    );
    Ok(())
}
