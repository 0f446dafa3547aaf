//! Client for an external Vietnamese-to-English translation model.
//!
//! The endpoint speaks the Hugging Face inference contract for translation
//! pipelines: `POST {"inputs": "...", "parameters": {"max_length": N}}`
//! answered by `[{"translation_text": "..."}]`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::NlpError;
use crate::http::{build_client, preview, truncate_chars, validate_endpoint};

/// Longest input, in characters, sent to the model in one call. Longer text
/// is truncated; the model's own output cap is set to the same value.
pub const MAX_INPUT_CHARS: usize = 2048;

/// Anything that can turn source text into English, best effort.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text`, or `None` if the text is blank or translation failed.
    async fn translate(&self, text: &str) -> Option<String>;
}

/// An absent translator translates nothing.
#[async_trait]
impl<T: Translator> Translator for Option<T> {
    async fn translate(&self, text: &str) -> Option<String> {
        match self {
            Some(inner) => inner.translate(text).await,
            None => None,
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    inputs: &'a str,
    parameters: TranslateParameters,
}

#[derive(Serialize)]
struct TranslateParameters {
    max_length: usize,
}

#[derive(Deserialize)]
struct TranslationItem {
    translation_text: String,
}

/// HTTP translation client.
pub struct TranslationClient {
    client: Client,
    url: String,
    api_token: Option<String>,
}

impl TranslationClient {
    /// Create a client for the model endpoint at `url`.
    ///
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

    /// Send one translation request and return the translated text.
    ///
    /// Input longer than [`MAX_INPUT_CHARS`] is truncated before sending.
    ///
    /// # Errors
    ///
    /// - [`NlpError::Http`] on network failure.
    /// - [`NlpError::UnexpectedStatus`] on a non-2xx response.
    /// - [`NlpError::UnexpectedShape`] if the body is not a non-empty list of
    ///   `{"translation_text": ...}` objects.
    pub async fn request_translation(&self, text: &str) -> Result<String, NlpError> {
        let body = TranslateRequest {
            inputs: truncate_chars(text, MAX_INPUT_CHARS),
            parameters: TranslateParameters {
                max_length: MAX_INPUT_CHARS,
            },
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
        parse_translation(&payload).ok_or_else(|| NlpError::UnexpectedShape {
            endpoint: self.url.clone(),
            detail: "expected [{\"translation_text\": ...}]".to_string(),
        })
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        match self.request_translation(text).await {
            Ok(translated) => Some(translated),
            Err(NlpError::UnexpectedShape { .. }) => {
                tracing::warn!(
                    text = preview(text),
                    "translation did not return the expected format"
                );
                None
            }
            Err(e) => {
                tracing::error!(text = preview(text), error = %e, "translation failed");
                None
            }
        }
    }
}

fn parse_translation(payload: &serde_json::Value) -> Option<String> {
    let items: Vec<TranslationItem> = serde_json::from_value(payload.clone()).ok()?;
    items.into_iter().next().map(|item| item.translation_text)
}
