mod ingest;
mod nlp;
mod tools;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use stockpulse_core::SqlIdentifier;
use tracing_subscriber::EnvFilter;

use crate::{ingest::IngestCommands, nlp::NlpCommands, tools::ToolsCommands};

#[derive(Debug, Parser)]
#[command(name = "stockpulse")]
#[command(about = "Stock news and price ingestion, and retrieval tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load article or price files into the search index / price table
    Ingest {
        #[command(subcommand)]
        command: IngestCommands,
    },
    /// Download price history CSVs for a list of tickers
    FetchPrices {
        /// Ticker symbols (e.g., NVDA MSFT)
        #[arg(required = true)]
        tickers: Vec<String>,
        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Bar interval passed to the chart API
        #[arg(long, default_value = "1mo")]
        interval: String,
        /// Output directory; defaults to the configured stock data directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Download but do not write any files
        #[arg(long)]
        dry_run: bool,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Call a retrieval tool and print its answer
    Tools {
        #[command(subcommand)]
        command: ToolsCommands,
    },
    /// Date parsing, translation and sentiment helpers
    Nlp {
        #[command(subcommand)]
        command: NlpCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Create the price table if it does not exist
    Init {
        /// Table to create; defaults to `PRICE_TABLE_NAME`
        #[arg(long)]
        table: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let fallback = std::env::var("STOCKPULSE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Ingest { command }) => {
            let config = stockpulse_core::load_app_config()?;
            ingest::run(&config, command).await?;
        }
        Some(Commands::FetchPrices {
            tickers,
            start,
            end,
            interval,
            out_dir,
            dry_run,
        }) => {
            let timeout_secs = request_timeout_from_env()?;
            let out_dir = out_dir.unwrap_or_else(|| {
                std::env::var("STOCKPULSE_STOCK_DATA_DIR")
                    .map_or_else(|_| PathBuf::from("data/stock_data"), PathBuf::from)
            });
            ingest::run_fetch_prices(
                &tickers,
                start,
                end,
                &interval,
                &out_dir,
                timeout_secs,
                dry_run,
            )
            .await?;
        }
        Some(Commands::Db { command }) => {
            let config = stockpulse_core::load_app_config()?;
            run_db(&config, command).await?;
        }
        Some(Commands::Tools { command }) => {
            let config = stockpulse_core::load_app_config()?;
            tools::run(&config, command).await?;
        }
        Some(Commands::Nlp { command }) => nlp::run(command).await?,
        None => println!("stockpulse: no command given, see --help"),
    }

    Ok(())
}

async fn run_db(config: &stockpulse_core::AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = stockpulse_db::connect_pool_from_config(config).await?;
    match command {
        DbCommands::Ping => {
            stockpulse_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Init { table } => {
            let name = table.as_deref().unwrap_or(&config.price_table);
            let table = SqlIdentifier::parse(name)?;
            stockpulse_db::ensure_price_table(&pool, &table).await?;
            println!("table {table} ready");
        }
    }
    Ok(())
}

/// `fetch-prices` needs no database, so it reads only the timeout rather than
/// the whole config.
fn request_timeout_from_env() -> anyhow::Result<u64> {
    match std::env::var("STOCKPULSE_REQUEST_TIMEOUT_SECS") {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("STOCKPULSE_REQUEST_TIMEOUT_SECS: {e}")),
        Err(_) => Ok(30),
    }
}

#[cfg(test)]
mod tests;
