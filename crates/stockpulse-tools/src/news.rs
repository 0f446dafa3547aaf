//! `retrieve_news_articles`: recent articles about a company, as text.

use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use stockpulse_core::ServiceError;
use stockpulse_search::{news_query, SearchHit};

use crate::backends::NewsSearch;

/// Characters of content shown in the snippet line.
pub const SNIPPET_CHARS: usize = 400;

const DEFAULT_DAYS_AGO: u32 = 7;
const DEFAULT_MAX_RESULTS: usize = 3;

fn default_days_ago() -> u32 {
    DEFAULT_DAYS_AGO
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewsArgs {
    pub company_name: String,
    #[serde(default = "default_days_ago")]
    pub days_ago: u32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// Searches for `args.company_name` articles published in the last
/// `args.days_ago` days (relative to `now`) and formats the newest
/// `args.max_results` as an article block.
///
/// # Errors
///
/// - [`ServiceError::ValidationFailure`] for a blank company name.
/// - Whatever the search backend reports if the search itself fails.
pub async fn retrieve_news_articles<S: NewsSearch + ?Sized>(
    search: &S,
    args: &NewsArgs,
    now: DateTime<Utc>,
) -> Result<String, ServiceError> {
    let company = args.company_name.trim();
    if company.is_empty() {
        return Err(ServiceError::ValidationFailure(
            "company_name must not be empty".to_string(),
        ));
    }
    tracing::info!(
        company,
        days_ago = args.days_ago,
        max_results = args.max_results,
        "retrieving news"
    );

    let since = now
        .checked_sub_signed(Duration::days(i64::from(args.days_ago)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let query = news_query(company, since);
    let hits = search
        .search_news(&query, args.max_results)
        .await
        .inspect_err(|e| tracing::error!(company, error = %e, "news search failed"))?;

    if hits.is_empty() {
        return Ok(format!(
            "No recent news articles found for '{}' in the last {} days.",
            args.company_name, args.days_ago
        ));
    }
    Ok(format_articles(&hits))
}

/// Renders hits as numbered `Article N:` blocks, preferring English fields.
#[must_use]
pub fn format_articles(hits: &[SearchHit]) -> String {
    let mut blocks = Vec::with_capacity(hits.len());
    for (i, hit) in hits.iter().enumerate() {
        let title = hit
            .source_str("title_en")
            .or_else(|| hit.source_str("title_vi"))
            .unwrap_or("N/A");
        let date = hit.source_str("publish_date").unwrap_or("N/A");
        let content = hit
            .source_str("content_en")
            .or_else(|| hit.source_str("content_vi"))
            .unwrap_or_default();
        let id = if hit.id.is_empty() { "N/A" } else { hit.id.as_str() };

        let mut block = String::new();
        let _ = writeln!(block, "Article {}:", i + 1);
        let _ = writeln!(block, "  ID: {id}");
        let _ = writeln!(block, "  Title: {title}");
        let _ = writeln!(block, "  Date: {date}");
        let _ = writeln!(block, "  Content Snippet: {}", snippet(content));
        let _ = writeln!(block, "  Full Content (for analysis): {content}");
        block.push_str("---");
        blocks.push(block);
    }
    blocks.join("\n")
}

fn snippet(content: &str) -> String {
    match content.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}
