//! Calls the retrieval tools from the command line, the same way the tool
//! server does.

use std::fmt::Write as _;
use std::sync::Arc;

use clap::Subcommand;
use serde_json::json;
use stockpulse_core::{AppConfig, PriceFrame, SqlIdentifier};
use stockpulse_search::SearchClient;
use stockpulse_tools::{PriceTable, SearchIndex, ToolResponse, Toolbox, NEWS_TOOL, PRICES_TOOL};

/// Sub-commands available under `tools`.
#[derive(Debug, Subcommand)]
pub enum ToolsCommands {
    /// Recent news articles about a company
    News {
        /// Company name as stored on the articles (e.g., "google")
        company: String,
        #[arg(long, default_value_t = 7)]
        days_ago: u32,
        #[arg(long, default_value_t = 3)]
        max_results: usize,
    },
    /// Recent daily prices for a ticker
    Prices {
        ticker: String,
        #[arg(long, default_value_t = 90)]
        days_ago: u32,
        /// Print the table as JSON instead of aligned columns
        #[arg(long)]
        json: bool,
    },
}

pub(crate) async fn run(config: &AppConfig, command: ToolsCommands) -> anyhow::Result<()> {
    let search = Arc::new(SearchClient::from_app_config(config)?);
    let pool = stockpulse_db::connect_pool_from_config(config).await?;
    let table = SqlIdentifier::parse(&config.price_table)?;
    let toolbox = Toolbox::new(
        Arc::new(SearchIndex::new(search, config.article_index.clone())),
        Arc::new(PriceTable::new(pool, table)),
    );

    let (name, args, as_json) = match command {
        ToolsCommands::News {
            company,
            days_ago,
            max_results,
        } => (
            NEWS_TOOL,
            json!({"company_name": company, "days_ago": days_ago, "max_results": max_results}),
            false,
        ),
        ToolsCommands::Prices {
            ticker,
            days_ago,
            json,
        } => (
            PRICES_TOOL,
            json!({"ticker": ticker, "days_ago": days_ago}),
            json,
        ),
    };

    match toolbox.invoke(name, &args).await {
        ToolResponse::Text { text } => println!("{text}"),
        ToolResponse::Table { table } if as_json => {
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        ToolResponse::Table { table } => print!("{}", render_table(&table)),
        ToolResponse::Failure { kind, reason } => anyhow::bail!("{kind}: {reason}"),
    }
    Ok(())
}

fn render_table(frame: &PriceFrame) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10}  {:>12}  {:>12}  {:>12}  {:>12}  {:>14}",
        "date", "open", "high", "low", "close", "volume"
    );
    for row in &frame.rows {
        let _ = writeln!(
            out,
            "{:<10}  {:>12}  {:>12}  {:>12}  {:>12}  {:>14}",
            row.date.format("%Y-%m-%d").to_string(),
            row.open.to_string(),
            row.high.to_string(),
            row.low.to_string(),
            row.close.to_string(),
            row.volume
        );
    }
    if let Some((first, last)) = frame.date_range() {
        let _ = writeln!(out, "{} rows for {} ({first} .. {last})", frame.len(), frame.ticker);
    }
    out
}
