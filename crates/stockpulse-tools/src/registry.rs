//! Tool definitions and name-based dispatch for an agent runtime.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use stockpulse_core::{PriceFrame, ServiceError};

use crate::backends::{NewsSearch, PriceHistory};
use crate::news::{retrieve_news_articles, NewsArgs};
use crate::prices::{retrieve_stock_prices, PriceArgs};

pub const NEWS_TOOL: &str = "retrieve_news_articles";
pub const PRICES_TOOL: &str = "retrieve_stock_prices_dataframe";

/// A tool as published to the agent runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    /// JSON schema of the argument object.
    pub parameters: Value,
}

/// Result of one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResponse {
    Text { text: String },
    Table { table: PriceFrame },
    Failure { kind: String, reason: String },
}

impl From<ServiceError> for ToolResponse {
    fn from(err: ServiceError) -> Self {
        Self::Failure {
            kind: err.kind().to_string(),
            reason: err.reason().to_string(),
        }
    }
}

impl ToolResponse {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

#[must_use]
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: NEWS_TOOL,
            description: "Searches the news index for recent articles about a specific company.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "company_name": {
                        "type": "string",
                        "description": "The company name (e.g., 'google', 'microsoft') to search for news articles."
                    },
                    "days_ago": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 7,
                        "description": "How many days back to search for articles."
                    },
                    "max_results": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 3,
                        "description": "Maximum number of articles to retrieve for analysis."
                    }
                },
                "required": ["company_name"]
            }),
        },
        ToolDefinition {
            name: PRICES_TOOL,
            description: "Retrieves historical stock price data (date, open, high, low, close, volume) for a ticker as a table.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "ticker": {
                        "type": "string",
                        "description": "The stock ticker symbol (e.g., GOOGL, MSFT)."
                    },
                    "days_ago": {
                        "type": "integer",
                        "minimum": 0,
                        "default": 90,
                        "description": "How many days of historical price data to retrieve."
                    }
                },
                "required": ["ticker"]
            }),
        },
    ]
}

/// Decodes tool arguments. Runtimes send either the argument object itself or
/// a JSON string containing it.
///
/// # Errors
///
/// Returns [`ServiceError::ValidationFailure`] when the arguments do not
/// match the tool's schema.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, ServiceError> {
    let parsed = match args {
        Value::String(raw) => serde_json::from_str(raw),
        other => T::deserialize(other),
    };
    parsed.map_err(|e| ServiceError::ValidationFailure(format!("invalid arguments for {tool}: {e}")))
}

/// The two retrieval tools bound to their backends.
#[derive(Clone)]
pub struct Toolbox {
    news: Arc<dyn NewsSearch>,
    prices: Arc<dyn PriceHistory>,
}

impl Toolbox {
    #[must_use]
    pub fn new(news: Arc<dyn NewsSearch>, prices: Arc<dyn PriceHistory>) -> Self {
        Self { news, prices }
    }

    /// Invokes the tool called `name` with JSON `args`.
    pub async fn invoke(&self, name: &str, args: &Value) -> ToolResponse {
        self.invoke_at(name, args, Utc::now()).await
    }

    /// Like [`Toolbox::invoke`] with an explicit clock.
    pub async fn invoke_at(&self, name: &str, args: &Value, now: DateTime<Utc>) -> ToolResponse {
        let result = match name {
            NEWS_TOOL => match parse_args::<NewsArgs>(name, args) {
                Ok(args) => retrieve_news_articles(self.news.as_ref(), &args, now)
                    .await
                    .map(|text| ToolResponse::Text { text }),
                Err(e) => Err(e),
            },
            PRICES_TOOL => match parse_args::<PriceArgs>(name, args) {
                Ok(args) => retrieve_stock_prices(self.prices.as_ref(), &args, now.date_naive())
                    .await
                    .map(|table| ToolResponse::Table { table }),
                Err(e) => Err(e),
            },
            other => Err(ServiceError::NotFound(format!("unknown tool: {other}"))),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!(tool = name, kind = e.kind(), reason = %e, "tool call failed");
            ToolResponse::from(e)
        })
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
