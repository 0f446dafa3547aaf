//! Shared configuration, domain records, and the error taxonomy used by every
//! stockpulse crate.

pub mod app_config;
pub mod config;
pub mod error;
pub mod identifier;
pub mod news;
pub mod prices;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, ServiceError};
pub use identifier::{is_sql_identifier, SqlIdentifier};
pub use news::{NewsDocument, RawArticle};
pub use prices::{PriceFrame, PricePoint, PriceRow, PRICE_FRAME_COLUMNS};
