use stockpulse_core::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("unexpected response shape from {endpoint}: {detail}")]
    UnexpectedShape { endpoint: String, detail: String },

    #[error("invalid endpoint URL \"{url}\": {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl From<NlpError> for ServiceError {
    fn from(err: NlpError) -> Self {
        match err {
            NlpError::UnexpectedShape { .. } | NlpError::InvalidEndpoint { .. } => {
                ServiceError::ValidationFailure(err.to_string())
            }
            NlpError::Http(_) | NlpError::UnexpectedStatus { .. } => {
                ServiceError::ConnectionFailure(err.to_string())
            }
        }
    }
}
