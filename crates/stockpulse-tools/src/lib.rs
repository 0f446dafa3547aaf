//! Read-only retrieval tools exposed to an agent runtime.
//!
//! Two tools: a news lookup over the article index that answers with a text
//! block, and a price lookup over the price table that answers with a
//! [`stockpulse_core::PriceFrame`]. Both are reachable by name through
//! [`Toolbox::invoke`], which always answers with a tagged [`ToolResponse`].

pub mod backends;
pub mod news;
pub mod prices;
pub mod registry;

pub use backends::{NewsSearch, PriceHistory, PriceTable, SearchIndex};
pub use news::{format_articles, retrieve_news_articles, NewsArgs};
pub use prices::{retrieve_stock_prices, PriceArgs};
pub use registry::{
    definitions, parse_args, ToolDefinition, ToolResponse, Toolbox, NEWS_TOOL, PRICES_TOOL,
};
