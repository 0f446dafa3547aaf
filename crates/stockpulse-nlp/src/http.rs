use std::time::Duration;

use reqwest::Client;

use crate::error::NlpError;

pub(crate) const USER_AGENT: &str = "stockpulse/0.1 (news-ingestion)";

pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, NlpError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

pub(crate) fn validate_endpoint(url: &str) -> Result<String, NlpError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| NlpError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(NlpError::InvalidEndpoint {
            url: url.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    Ok(url.to_string())
}

/// Cut `text` to at most `max_chars` characters, on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// First 50 characters, for log lines.
pub(crate) fn preview(text: &str) -> &str {
    truncate_chars(text, 50)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_multibyte_boundaries() {
        let text = "Lợi nhuận tăng";
        assert_eq!(truncate_chars(text, 3), "Lợi");
        assert_eq!(truncate_chars(text, 100), text);
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn validate_endpoint_rejects_non_http() {
        assert!(validate_endpoint("http://localhost:8080/translate").is_ok());
        assert!(matches!(
            validate_endpoint("ftp://models"),
            Err(NlpError::InvalidEndpoint { .. })
        ));
        assert!(matches!(
            validate_endpoint("not a url"),
            Err(NlpError::InvalidEndpoint { .. })
        ));
    }
}
