use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

/// Query DSL for articles about `company` published on or after `since`,
/// newest first.
///
/// The company is lower-cased to match how ingestion stores it.
#[must_use]
pub fn news_query(company: &str, since: DateTime<Utc>) -> Value {
    json!({
        "query": {
            "bool": {
                "must": [
                    { "match": { "company": company.trim().to_lowercase() } }
                ],
                "filter": [
                    {
                        "range": {
                            "publish_date": {
                                "gte": since.to_rfc3339_opts(SecondsFormat::Secs, false)
                            }
                        }
                    }
                ]
            }
        },
        "sort": [
            { "publish_date": { "order": "desc" } }
        ]
    })
}
