//! Batch ingestion for stockpulse.
//!
//! - [`news`]: reads scraped article batches, translates them, and bulk-loads
//!   them into the search index.
//! - [`stocks`]: reads per-ticker price CSVs, cleans them, and appends them to
//!   the price table.
//! - [`crawler`]: downloads price history and writes the CSV layout the stock
//!   pipeline reads.
//!
//! Pipelines take their sinks as trait objects ([`DocumentSink`],
//! [`PriceSink`]) so they can run against in-memory fakes.

pub mod crawler;
pub mod error;
pub mod news;
pub mod sink;
pub mod stocks;

pub use crawler::{crawl_to_dir, price_csv_file_name, write_price_csv, CrawlSummary, PriceCrawler};
pub use error::IngestError;
pub use news::{
    build_documents, company_from_path, ingest_news_dir, load_articles, translate_and_index,
    BatchSummary, NewsIngestSummary,
};
pub use sink::{DocumentSink, DryRunSink, PgPriceSink, PriceSink};
pub use stocks::{
    extract_ticker, ingest_stock_dir, parse_price_csv, process_stock_file, CleanedTable,
    StockIngestSummary, HEADER_ROWS,
};
