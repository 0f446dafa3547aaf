//! HTTP client for the Elasticsearch REST API.
//!
//! Wraps `reqwest` with Elasticsearch-specific auth, URL building, and error
//! decoding. Use [`SearchClient::new`] with the cluster URL (a `wiremock`
//! server URI in tests).

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::Serialize;
use stockpulse_core::AppConfig;

use crate::error::SearchError;
use crate::types::{
    BulkItemError, BulkResponse, BulkSummary, ErrorEnvelope, GetResponse, IndexResponse, Refresh,
    SearchHit, SearchResponse,
};

/// Number of failed bulk items logged individually.
const LOGGED_BULK_ERRORS: usize = 5;

/// How requests authenticate against the cluster.
#[derive(Clone, PartialEq, Eq)]
pub enum SearchAuth {
    None,
    /// Encoded API key, sent as `Authorization: ApiKey <key>`.
    ApiKey(String),
    Basic { user: String, password: String },
}

impl std::fmt::Debug for SearchAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::ApiKey(_) => f.write_str("ApiKey([redacted])"),
            Self::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"[redacted]")
                .finish(),
        }
    }
}

impl SearchAuth {
    /// API key wins over basic auth; basic auth needs both user and password.
    #[must_use]
    pub fn from_parts(
        api_key: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Self {
        match (api_key, user, password) {
            (Some(key), _, _) => Self::ApiKey(key.to_string()),
            (None, Some(user), Some(password)) => Self::Basic {
                user: user.to_string(),
                password: password.to_string(),
            },
            _ => Self::None,
        }
    }
}

/// Client for one Elasticsearch cluster.
pub struct SearchClient {
    client: Client,
    base_url: Url,
    auth: SearchAuth,
}

impl SearchClient {
    /// Creates a client for the cluster at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SearchError::InvalidUrl`] if `base_url`
    /// is not an absolute http(s) URL.
    pub fn new(base_url: &str, auth: SearchAuth, timeout_secs: u64) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("stockpulse/0.1 (news-search)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| SearchError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            auth,
        })
    }

    /// Builds a client from the search settings in [`AppConfig`].
    ///
    /// # Errors
    ///
    /// See [`SearchClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, SearchError> {
        let auth = SearchAuth::from_parts(
            config.search_api_key.as_deref(),
            config.search_user.as_deref(),
            config.search_password.as_deref(),
        );
        Self::new(&config.search_url, auth, config.request_timeout_secs)
    }

    /// Verifies the cluster is reachable and accepts our credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] on network failure or
    /// [`SearchError::UnexpectedStatus`] on a non-2xx answer.
    pub async fn ping(&self) -> Result<(), SearchError> {
        let url = self.base_url.clone();
        let response = self.request(Method::HEAD, url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        tracing::info!(url = %self.base_url, "connected to search cluster");
        Ok(())
    }

    /// Indexes a single document. With `id` the document is written at that
    /// id (`PUT`); without, the cluster generates one (`POST`).
    ///
    /// # Errors
    ///
    /// - [`SearchError::Api`] if the cluster rejects the document.
    /// - [`SearchError::Http`] on network failure.
    /// - [`SearchError::Deserialize`] if the response is not an index result.
    pub async fn index_document<T: Serialize + ?Sized>(
        &self,
        index: &str,
        document: &T,
        id: Option<&str>,
        refresh: Option<Refresh>,
    ) -> Result<IndexResponse, SearchError> {
        let (method, mut url) = match id {
            Some(id) => (Method::PUT, self.endpoint(&[index, "_doc", id])?),
            None => (Method::POST, self.endpoint(&[index, "_doc"])?),
        };
        if let Some(refresh) = refresh {
            url.query_pairs_mut()
                .append_pair("refresh", refresh.as_param());
        }

        let response = self.request(method, url).json(document).send().await?;
        let body = Self::read_json(response, "index document").await?;
        let indexed: IndexResponse =
            serde_json::from_value(body).map_err(|e| SearchError::Deserialize {
                context: format!("index into {index}"),
                source: e,
            })?;
        tracing::debug!(id = %indexed.id, index, "indexed document");
        Ok(indexed)
    }

    /// Submits all `documents` to `index` in one `_bulk` request.
    ///
    /// When `doc_id_field` names a string field present in a document, its
    /// value becomes that document's `_id`; otherwise the cluster generates
    /// one. Never fails: a transport or decoding failure counts every
    /// document as failed, and per-item failures are taken from the
    /// response. The first few item errors are logged.
    pub async fn bulk_index<T: Serialize>(
        &self,
        index: &str,
        documents: &[T],
        doc_id_field: Option<&str>,
    ) -> BulkSummary {
        if documents.is_empty() {
            tracing::info!(index, "bulk index called with no documents");
            return BulkSummary::default();
        }

        let payload = match build_bulk_body(index, documents, doc_id_field) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(index, error = %e, "failed to encode bulk payload");
                return BulkSummary::all_failed(documents.len());
            }
        };

        let url = match self.endpoint(&["_bulk"]) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(index, error = %e, "failed to build bulk URL");
                return BulkSummary::all_failed(documents.len());
            }
        };

        let response = self
            .request(Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .await;

        let body = match response {
            Ok(resp) => Self::read_json(resp, "bulk index").await,
            Err(e) => Err(SearchError::from(e)),
        };

        let summary = match body.and_then(|b| {
            serde_json::from_value::<BulkResponse>(b).map_err(|e| SearchError::Deserialize {
                context: format!("bulk into {index}"),
                source: e,
            })
        }) {
            Ok(parsed) => summarize_bulk(&parsed, documents.len()),
            Err(e) => {
                tracing::error!(index, error = %e, "bulk indexing request failed");
                return BulkSummary::all_failed(documents.len());
            }
        };

        if summary.failed > 0 {
            tracing::error!(
                index,
                failed = summary.failed,
                "bulk indexing completed with errors"
            );
            for (n, err) in summary.errors.iter().take(LOGGED_BULK_ERRORS).enumerate() {
                tracing::error!(
                    n = n + 1,
                    id = err.id.as_deref().unwrap_or("N/A"),
                    error_type = %err.error_type,
                    reason = %err.reason,
                    "bulk item error"
                );
            }
        } else {
            tracing::info!(index, succeeded = summary.succeeded, "bulk indexed documents");
        }

        summary
    }

    /// Fetches a document's `_source` by id; `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] on network failure or
    /// [`SearchError::Api`] for any error other than not-found.
    pub async fn get_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, SearchError> {
        let url = self.endpoint(&[index, "_doc", id])?;
        let response = self.request(Method::GET, url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(id, index, "document not found");
            return Ok(None);
        }
        let body = Self::read_json(response, "get document").await?;
        let doc: GetResponse = serde_json::from_value(body).map_err(|e| SearchError::Deserialize {
            context: format!("get {index}/{id}"),
            source: e,
        })?;
        Ok(if doc.found { doc.source } else { None })
    }

    /// Runs a query-DSL `body` against `index`, returning at most `size` hits.
    ///
    /// # Errors
    ///
    /// - [`SearchError::Api`] if the cluster rejects the query.
    /// - [`SearchError::Http`] on network failure.
    /// - [`SearchError::Deserialize`] if the response has no hit list.
    pub async fn search(
        &self,
        index: &str,
        body: &serde_json::Value,
        size: usize,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let mut url = self.endpoint(&[index, "_search"])?;
        url.query_pairs_mut().append_pair("size", &size.to_string());

        let response = self.request(Method::POST, url).json(body).send().await?;
        let payload = Self::read_json(response, "search").await?;
        let parsed: SearchResponse =
            serde_json::from_value(payload).map_err(|e| SearchError::Deserialize {
                context: format!("search {index}"),
                source: e,
            })?;

        let hits = parsed.hits.hits;
        let total = parsed.hits.total.map_or_else(
            || hits.len().to_string(),
            |t| {
                let plus = if t.relation.as_deref() == Some("gte") { "+" } else { "" };
                format!("{}{plus}", t.value)
            },
        );
        tracing::info!(index, total = %total, returned = hits.len(), "search complete");
        Ok(hits)
    }

    /// Builds `<base>/<segments...>` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| SearchError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth {
            SearchAuth::None => builder,
            SearchAuth::ApiKey(key) => {
                builder.header(reqwest::header::AUTHORIZATION, format!("ApiKey {key}"))
            }
            SearchAuth::Basic { user, password } => builder.basic_auth(user, Some(password)),
        }
    }

    /// Decodes a JSON body, turning non-2xx answers into [`SearchError::Api`]
    /// (when the body carries an Elasticsearch error) or
    /// [`SearchError::UnexpectedStatus`].
    async fn read_json(
        response: reqwest::Response,
        context: &str,
    ) -> Result<serde_json::Value, SearchError> {
        let status = response.status();
        let url = response.url().to_string();
        let text = response.text().await?;

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&text) {
                return Err(SearchError::Api {
                    status: status.as_u16(),
                    error_type: envelope.error.error_type,
                    reason: envelope.error.reason.unwrap_or_default(),
                });
            }
            return Err(SearchError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        serde_json::from_str(&text).map_err(|e| SearchError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

/// Encodes documents as `_bulk` NDJSON: an action line then the source line
/// for each document, newline-terminated.
fn build_bulk_body<T: Serialize>(
    index: &str,
    documents: &[T],
    doc_id_field: Option<&str>,
) -> Result<String, serde_json::Error> {
    let mut body = String::new();
    for doc in documents {
        let source = serde_json::to_value(doc)?;
        let mut action = serde_json::json!({ "_index": index });
        if let Some(id) = doc_id_field
            .and_then(|field| source.get(field))
            .and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        {
            action["_id"] = serde_json::Value::String(id);
        }
        let action_line = serde_json::json!({ "index": action });
        let _ = writeln!(body, "{action_line}");
        let _ = writeln!(body, "{source}");
    }
    Ok(body)
}

fn summarize_bulk(response: &BulkResponse, submitted: usize) -> BulkSummary {
    let mut summary = BulkSummary::default();
    for item in &response.items {
        for result in item.values() {
            if (200..300).contains(&result.status) {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
                let (error_type, reason) = result.error.as_ref().map_or_else(
                    || ("Unknown Type".to_string(), "Unknown Reason".to_string()),
                    |e| {
                        (
                            e.error_type.clone(),
                            e.reason.clone().unwrap_or_else(|| "Unknown Reason".to_string()),
                        )
                    },
                );
                summary.errors.push(BulkItemError {
                    id: result.id.clone(),
                    status: result.status,
                    error_type,
                    reason,
                });
            }
        }
    }

    // Items the cluster never reported on are counted as failed.
    let reported = summary.succeeded + summary.failed;
    if reported < submitted {
        summary.failed += submitted - reported;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> SearchClient {
        SearchClient::new(base_url, SearchAuth::None, 5)
            .expect("client construction should not fail")
    }

    #[test]
    fn endpoint_joins_and_encodes_segments() {
        let client = test_client("http://localhost:9200/");
        let url = client.endpoint(&["news_data", "_doc", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9200/news_data/_doc/a%20b%2Fc");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = test_client("https://proxy.internal/es");
        let url = client.endpoint(&["_bulk"]).unwrap();
        assert_eq!(url.as_str(), "https://proxy.internal/es/_bulk");
    }

    #[test]
    fn new_rejects_non_http_scheme() {
        let result = SearchClient::new("ftp://es", SearchAuth::None, 5);
        assert!(matches!(result, Err(SearchError::InvalidUrl { .. })));
    }

    #[test]
    fn auth_prefers_api_key_then_complete_basic() {
        assert_eq!(
            SearchAuth::from_parts(Some("k"), Some("u"), Some("p")),
            SearchAuth::ApiKey("k".to_string())
        );
        assert_eq!(
            SearchAuth::from_parts(None, Some("u"), Some("p")),
            SearchAuth::Basic {
                user: "u".to_string(),
                password: "p".to_string()
            }
        );
        assert_eq!(SearchAuth::from_parts(None, Some("u"), None), SearchAuth::None);
    }

    #[test]
    fn auth_debug_redacts_secrets() {
        let debug = format!(
            "{:?}",
            SearchAuth::Basic {
                user: "elastic".to_string(),
                password: "hunter2".to_string()
            }
        );
        assert!(debug.contains("elastic"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn bulk_body_is_action_then_source_per_document() {
        let docs = vec![
            serde_json::json!({"slug": "a", "title_vi": "x"}),
            serde_json::json!({"title_vi": "y"}),
        ];
        let body = build_bulk_body("news_data", &docs, Some("slug")).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["index"]["_index"], "news_data");
        assert_eq!(first["index"]["_id"], "a");
        let third: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert!(third["index"].get("_id").is_none());
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn summarize_counts_unreported_items_as_failed() {
        let response: BulkResponse = serde_json::from_value(serde_json::json!({
            "items": [
                {"index": {"_id": "1", "status": 201}},
                {"index": {"_id": "2", "status": 400,
                    "error": {"type": "mapper_parsing_exception", "reason": "bad date"}}}
            ]
        }))
        .unwrap();
        let summary = summarize_bulk(&response, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].error_type, "mapper_parsing_exception");
        assert_eq!(summary.errors[0].id.as_deref(), Some("2"));
    }
}
