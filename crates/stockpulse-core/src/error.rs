use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Closed set of failure modes surfaced by the retrieval tools and the
/// ingestion summaries.
///
/// The message carried by each variant is the human-readable reason shown to
/// the caller as-is; [`ServiceError::kind`] gives the stable machine tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// An external service could not be reached or rejected the request.
    #[error("{0}")]
    ConnectionFailure(String),

    /// Input or returned data did not have the expected shape.
    #[error("{0}")]
    ValidationFailure(String),

    /// The request was well-formed but matched nothing.
    #[error("{0}")]
    NotFound(String),
}

impl ServiceError {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionFailure(_) => "connection_failure",
            Self::ValidationFailure(_) => "validation_failure",
            Self::NotFound(_) => "not_found",
        }
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::ConnectionFailure(r) | Self::ValidationFailure(r) | Self::NotFound(r) => r,
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(err: ConfigError) -> Self {
        Self::ValidationFailure(err.to_string())
    }
}
