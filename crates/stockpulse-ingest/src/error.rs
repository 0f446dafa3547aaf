use std::path::PathBuf;

use stockpulse_core::ServiceError;
use stockpulse_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("could not extract ticker from file name {0:?}")]
    InvalidFileName(String),

    #[error("no usable rows in {}", .0.display())]
    EmptyTable(PathBuf),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("price history for {ticker} unavailable: {reason}")]
    History { ticker: String, reason: String },
}

impl From<IngestError> for ServiceError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Db(db) => ServiceError::from(db),
            IngestError::MissingDirectory(_) => ServiceError::NotFound(err.to_string()),
            IngestError::Http(_) | IngestError::UnexpectedStatus { .. } => {
                ServiceError::ConnectionFailure(err.to_string())
            }
            IngestError::Io { .. }
            | IngestError::Json { .. }
            | IngestError::Csv { .. }
            | IngestError::InvalidFileName(_)
            | IngestError::EmptyTable(_)
            | IngestError::History { .. } => ServiceError::ValidationFailure(err.to_string()),
        }
    }
}
