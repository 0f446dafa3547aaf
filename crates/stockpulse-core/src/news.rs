//! Article records before and after normalization.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// One article as it appears in a scraped JSON batch.
///
/// Every field is optional at this stage; the ingestion pipeline decides
/// which records are usable. A field holding anything but a string (a number,
/// `null`, an object) reads as absent, so one malformed record never sinks
/// the rest of its batch. Unknown fields in the source are ignored. The
/// company label comes from the batch file name, not the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawArticle {
    #[serde(default, deserialize_with = "text_or_absent")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "text_or_absent")]
    pub publish_date: Option<String>,
    #[serde(default, deserialize_with = "text_or_absent")]
    pub content: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextField {
    Text(String),
    Other(IgnoredAny),
}

fn text_or_absent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match TextField::deserialize(deserializer)? {
        TextField::Text(text) => Some(text),
        TextField::Other(_) => None,
    })
}

/// A normalized, indexable news document.
///
/// Absent fields are omitted from the serialized form entirely rather than
/// written as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsDocument {
    pub title_vi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_vi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_en: Option<String>,
    /// ISO-8601 timestamp at UTC midnight, e.g. `2024-03-15T00:00:00+00:00`.
    pub publish_date: String,
    pub company: String,
}

impl NewsDocument {
    /// English title when present, otherwise the Vietnamese title.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title_en.as_deref().unwrap_or(&self.title_vi)
    }

    /// English content when present, otherwise the Vietnamese content, or `""`.
    #[must_use]
    pub fn display_content(&self) -> &str {
        self.content_en
            .as_deref()
            .or(self.content_vi.as_deref())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> NewsDocument {
        NewsDocument {
            title_vi: "Lợi nhuận tăng".to_string(),
            title_en: None,
            content_vi: None,
            content_en: None,
            publish_date: "2024-03-15T00:00:00+00:00".to_string(),
            company: "acme".to_string(),
        }
    }

    #[test]
    fn absent_fields_are_omitted_when_serialized() {
        let json = serde_json::to_value(doc()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(!obj.contains_key("title_en"));
        assert!(!obj.contains_key("content_vi"));
        assert_eq!(obj["company"], "acme");
    }

    #[test]
    fn display_prefers_english() {
        let mut d = doc();
        assert_eq!(d.display_title(), "Lợi nhuận tăng");
        assert_eq!(d.display_content(), "");
        d.title_en = Some("Profit rises".to_string());
        d.content_vi = Some("nội dung".to_string());
        assert_eq!(d.display_title(), "Profit rises");
        assert_eq!(d.display_content(), "nội dung");
    }

    #[test]
    fn raw_article_ignores_unknown_fields() {
        let raw: RawArticle = serde_json::from_str(
            r#"{"title":"t","publish_date":"01/02/2024","company":"x","url":"https://x","tags":[]}"#,
        )
        .unwrap();
        assert_eq!(raw.title.as_deref(), Some("t"));
        assert!(raw.content.is_none());
    }

    #[test]
    fn raw_article_non_string_fields_read_as_absent() {
        let raw: Vec<RawArticle> = serde_json::from_str(
            r#"[{"title":42,"publish_date":20240315,"content":{"body":"x"}},
                {"title":null,"publish_date":["15/03/2024"],"content":"ok"}]"#,
        )
        .unwrap();
        assert_eq!(raw[0], RawArticle::default());
        assert!(raw[1].title.is_none());
        assert!(raw[1].publish_date.is_none());
        assert_eq!(raw[1].content.as_deref(), Some("ok"));
    }
}
