//! Elasticsearch REST client for the article index.
//!
//! Covers the handful of operations the pipelines and tools need: a
//! connectivity check, single and bulk document writes, get-by-id, and
//! query-DSL search.

pub mod client;
pub mod error;
pub mod query;
pub mod types;

pub use client::{SearchAuth, SearchClient};
pub use error::SearchError;
pub use query::news_query;
pub use types::{BulkItemError, BulkSummary, IndexResponse, Refresh, SearchHit};
