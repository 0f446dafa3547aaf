use serde::Deserialize;

/// Index refresh policy for single-document writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    True,
    False,
    WaitFor,
}

impl Refresh {
    #[must_use]
    pub fn as_param(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::WaitFor => "wait_for",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index")]
    pub index: String,
    pub result: String,
}

/// One hit from a search response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: serde_json::Value,
}

impl SearchHit {
    /// String field from `_source`, if present and a string.
    #[must_use]
    pub fn source_str(&self, field: &str) -> Option<&str> {
        self.source.get(field).and_then(serde_json::Value::as_str)
    }
}

/// A failed item from a bulk request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemError {
    pub id: Option<String>,
    pub status: u16,
    pub error_type: String,
    pub reason: String,
}

/// Outcome of one bulk submission, as reported by the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BulkItemError>,
}

impl BulkSummary {
    /// Every submitted document counted as failed, e.g. on transport failure.
    #[must_use]
    pub fn all_failed(count: usize) -> Self {
        Self {
            succeeded: 0,
            failed: count,
            errors: Vec::new(),
        }
    }
}

// Wire shapes for responses that are only consumed inside this crate.

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HitsEnvelope {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TotalHits {
    pub value: u64,
    #[serde(default)]
    pub relation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponse {
    #[serde(default)]
    pub items: Vec<std::collections::HashMap<String, BulkItemResult>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkItemResult {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub status: u16,
    #[serde(default)]
    pub error: Option<ErrorCause>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorCause,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorCause {
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GetResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_source", default)]
    pub source: Option<serde_json::Value>,
}
