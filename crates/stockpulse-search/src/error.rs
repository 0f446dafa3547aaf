use stockpulse_core::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid search URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Elasticsearch answered with an `{"error": {...}}` body.
    #[error("search API error {status} ({error_type}): {reason}")]
    Api {
        status: u16,
        error_type: String,
        reason: String,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<SearchError> for ServiceError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Http(_) | SearchError::UnexpectedStatus { .. } => {
                ServiceError::ConnectionFailure(err.to_string())
            }
            SearchError::Api { status: 404, .. } => ServiceError::NotFound(err.to_string()),
            SearchError::Api { status, .. } if status >= 500 => {
                ServiceError::ConnectionFailure(err.to_string())
            }
            SearchError::Api { .. }
            | SearchError::InvalidUrl { .. }
            | SearchError::Deserialize { .. } => ServiceError::ValidationFailure(err.to_string()),
        }
    }
}
