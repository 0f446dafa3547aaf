//! `retrieve_stock_prices_dataframe`: recent bars for a ticker, as a table.

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use stockpulse_core::{PriceFrame, ServiceError, PRICE_FRAME_COLUMNS};
use stockpulse_db::DbError;

use crate::backends::PriceHistory;

const DEFAULT_DAYS_AGO: u32 = 90;

fn default_days_ago() -> u32 {
    DEFAULT_DAYS_AGO
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceArgs {
    pub ticker: String,
    #[serde(default = "default_days_ago")]
    pub days_ago: u32,
}

/// Looks up the last `args.days_ago` days of bars for `args.ticker`
/// (relative to `today`), oldest first.
///
/// # Errors
///
/// - [`ServiceError::NotFound`] when no rows match.
/// - [`ServiceError::ValidationFailure`] for a blank ticker, or when the
///   rows lack a required column.
/// - The mapped backend failure otherwise.
pub async fn retrieve_stock_prices<H: PriceHistory + ?Sized>(
    history: &H,
    args: &PriceArgs,
    today: NaiveDate,
) -> Result<PriceFrame, ServiceError> {
    let ticker = args.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(ServiceError::ValidationFailure(
            "ticker must not be empty".to_string(),
        ));
    }
    tracing::info!(ticker = %ticker, days_ago = args.days_ago, "retrieving stock prices");

    let since = today
        .checked_sub_days(Days::new(u64::from(args.days_ago)))
        .unwrap_or(NaiveDate::MIN);

    let rows = match history.prices_since(&ticker, since).await {
        Ok(rows) => rows,
        Err(DbError::MissingColumns(missing)) => {
            tracing::error!(ticker = %ticker, ?missing, "price rows missing columns");
            return Err(ServiceError::ValidationFailure(format!(
                "Error: Retrieved data for {ticker} is missing required columns ({})",
                column_list()
            )));
        }
        Err(e) => {
            tracing::error!(ticker = %ticker, error = %e, "price lookup failed");
            let message = format!("Error retrieving stock price DataFrame for {ticker}.");
            return Err(match ServiceError::from(e) {
                ServiceError::ConnectionFailure(_) => ServiceError::ConnectionFailure(message),
                ServiceError::ValidationFailure(_) => ServiceError::ValidationFailure(message),
                ServiceError::NotFound(_) => ServiceError::NotFound(message),
            });
        }
    };

    if rows.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "No price data found for ticker {ticker} in the last {} days to create DataFrame.",
            args.days_ago
        )));
    }

    let frame = PriceFrame::new(ticker, rows);
    tracing::info!(ticker = %frame.ticker, rows = frame.len(), "retrieved price frame");
    Ok(frame)
}

/// `['date', 'open', ...]`
fn column_list() -> String {
    let quoted: Vec<String> = PRICE_FRAME_COLUMNS
        .iter()
        .map(|c| format!("'{c}'"))
        .collect();
    format!("[{}]", quoted.join(", "))
}
