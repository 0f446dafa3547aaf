//! Date and text normalization for news ingestion.
//!
//! Parses source dates into canonical UTC timestamps and wraps two external
//! model endpoints: a Vietnamese-to-English translator and a financial
//! sentiment classifier. Both model calls are single best-effort attempts;
//! failures are logged and surface as `None`.

pub mod dates;
pub mod error;
pub mod sentiment;
pub mod translate;

mod http;

pub use dates::{parse_date, parse_day_month_year};
pub use error::NlpError;
pub use sentiment::{SentimentClient, SentimentLabel};
pub use translate::{TranslationClient, Translator, MAX_INPUT_CHARS};
