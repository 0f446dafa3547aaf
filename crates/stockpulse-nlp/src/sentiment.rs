//! Client for an external financial sentiment classifier (FinBERT-style).
//!
//! Text-classification endpoints answer either `[{"label", "score"}, ...]`
//! or the same list nested one level deeper; both are accepted and the
//! highest-scoring label wins.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::NlpError;
use crate::http::{build_client, preview, truncate_chars, validate_endpoint};
use crate::translate::MAX_INPUT_CHARS;

/// Top classification for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentLabel {
    pub label: String,
    pub score: f32,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Flat(Vec<SentimentLabel>),
    Nested(Vec<Vec<SentimentLabel>>),
}

pub struct SentimentClient {
    client: Client,
    url: String,
    api_token: Option<String>,
}

impl SentimentClient {
    /// # Errors
    ///
    /// Returns [`NlpError::InvalidEndpoint`] if `url` is not an http(s) URL,
    /// or [`NlpError::Http`] if the HTTP client cannot be built.
    pub fn new(url: &str, api_token: Option<&str>, timeout_secs: u64) -> Result<Self, NlpError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            url: validate_endpoint(url)?,
            api_token: api_token.map(ToOwned::to_owned),
        })
    }

    /// Classify `text` and return the top label.
    ///
    /// # Errors
    ///
    /// - [`NlpError::Http`] on network failure.
    /// - [`NlpError::UnexpectedStatus`] on a non-2xx response.
    /// - [`NlpError::UnexpectedShape`] if no label can be read from the body.
    pub async fn classify(&self, text: &str) -> Result<SentimentLabel, NlpError> {
        let body = ClassifyRequest {
            inputs: truncate_chars(text, MAX_INPUT_CHARS),
        };
        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NlpError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        let payload: serde_json::Value = response.json().await?;
        top_label(payload).ok_or_else(|| NlpError::UnexpectedShape {
            endpoint: self.url.clone(),
            detail: "expected a list of {label, score}".to_string(),
        })
    }

    /// Best-effort classification: `None` on blank input or any failure.
    pub async fn analyze(&self, text: &str) -> Option<SentimentLabel> {
        if text.trim().is_empty() {
            return None;
        }
        match self.classify(text).await {
            Ok(label) => Some(label),
            Err(e) => {
                tracing::error!(text = preview(text), error = %e, "sentiment analysis failed");
                None
            }
        }
    }
}

fn top_label(payload: serde_json::Value) -> Option<SentimentLabel> {
    let labels = match serde_json::from_value::<ClassifyResponse>(payload).ok()? {
        ClassifyResponse::Flat(labels) => labels,
        ClassifyResponse::Nested(outer) => outer.into_iter().next()?,
    };
    labels
        .into_iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
}
