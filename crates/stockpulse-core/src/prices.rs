//! Price records: rows bound for the relational sink and the tabular value
//! returned by the price lookup.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Column order of a [`PriceFrame`].
pub const PRICE_FRAME_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// One cleaned daily/monthly bar for a ticker. Identity is `(ticker, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRow {
    pub ticker: String,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

impl PriceRow {
    #[must_use]
    pub fn point(&self) -> PricePoint {
        PricePoint {
            date: self.date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        }
    }
}

/// A bar without its ticker, as carried inside a [`PriceFrame`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: i64,
}

/// Structured price history for one ticker, ordered by date ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceFrame {
    pub ticker: String,
    pub columns: Vec<&'static str>,
    pub rows: Vec<PricePoint>,
}

impl PriceFrame {
    #[must_use]
    pub fn new(ticker: impl Into<String>, rows: Vec<PricePoint>) -> Self {
        Self {
            ticker: ticker.into(),
            columns: PRICE_FRAME_COLUMNS.to_vec(),
            rows,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest date in the frame.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.first()?.date;
        let last = self.rows.last()?.date;
        Some((first, last))
    }
}
