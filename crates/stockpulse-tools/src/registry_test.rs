use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone};
use rust_decimal::Decimal;
use stockpulse_core::PricePoint;
use stockpulse_db::DbError;
use stockpulse_search::SearchHit;

use super::*;

struct NoNews;

#[async_trait]
impl NewsSearch for NoNews {
    async fn search_news(&self, _query: &Value, _size: usize) -> Result<Vec<SearchHit>, ServiceError> {
        Ok(Vec::new())
    }
}

struct OneBar;

#[async_trait]
impl PriceHistory for OneBar {
    async fn prices_since(
        &self,
        ticker: &str,
        _since: NaiveDate,
    ) -> Result<Vec<PricePoint>, DbError> {
        if ticker != "MSFT" {
            return Ok(Vec::new());
        }
        Ok(vec![PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            open: Decimal::new(1000, 2),
            high: Decimal::new(1100, 2),
            low: Decimal::new(900, 2),
            close: Decimal::new(1050, 2),
            volume: 42,
        }])
    }
}

fn toolbox() -> Toolbox {
    Toolbox::new(Arc::new(NoNews), Arc::new(OneBar))
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 0, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// definitions / parse_args
// ---------------------------------------------------------------------------

#[test]
fn both_tools_are_published_with_required_fields() {
    let defs = definitions();
    let names: Vec<&str> = defs.iter().map(|d| d.name).collect();
    assert_eq!(names, vec![NEWS_TOOL, PRICES_TOOL]);
    assert_eq!(defs[0].parameters["required"], json!(["company_name"]));
    assert_eq!(defs[1].parameters["required"], json!(["ticker"]));
    assert_eq!(defs[1].parameters["properties"]["days_ago"]["default"], 90);
}

#[test]
fn args_accept_object_or_encoded_string() {
    let from_object: NewsArgs =
        parse_args(NEWS_TOOL, &json!({"company_name": "acme", "days_ago": 30})).unwrap();
    let from_string: NewsArgs =
        parse_args(NEWS_TOOL, &json!(r#"{"company_name": "acme", "days_ago": 30}"#)).unwrap();

    assert_eq!(from_object, from_string);
    assert_eq!(from_object.max_results, 3);
}

#[test]
fn args_fill_defaults() {
    let news: NewsArgs = parse_args(NEWS_TOOL, &json!({"company_name": "acme"})).unwrap();
    assert_eq!((news.days_ago, news.max_results), (7, 3));

    let prices: PriceArgs = parse_args(PRICES_TOOL, &json!({"ticker": "msft"})).unwrap();
    assert_eq!(prices.days_ago, 90);
}

#[test]
fn bad_args_are_validation_failures() {
    let err = parse_args::<PriceArgs>(PRICES_TOOL, &json!({"days_ago": 5})).unwrap_err();
    assert_eq!(err.kind(), "validation_failure");
    assert!(err.reason().starts_with("invalid arguments for retrieve_stock_prices_dataframe"));

    let err = parse_args::<NewsArgs>(NEWS_TOOL, &json!("not json")).unwrap_err();
    assert_eq!(err.kind(), "validation_failure");

    let err =
        parse_args::<NewsArgs>(NEWS_TOOL, &json!({"company_name": "x", "days_ago": -1})).unwrap_err();
    assert_eq!(err.kind(), "validation_failure");
}

// ---------------------------------------------------------------------------
// invoke
// ---------------------------------------------------------------------------

#[tokio::test]
async fn news_tool_returns_text() {
    let response = toolbox()
        .invoke_at(NEWS_TOOL, &json!({"company_name": "acme"}), now())
        .await;
    assert_eq!(
        response,
        ToolResponse::Text {
            text: "No recent news articles found for 'acme' in the last 7 days.".to_string()
        }
    );
}

#[tokio::test]
async fn price_tool_returns_table() {
    let response = toolbox()
        .invoke_at(PRICES_TOOL, &json!("{\"ticker\": \"msft\"}"), now())
        .await;

    let ToolResponse::Table { table } = response else {
        panic!("expected a table, got {response:?}");
    };
    assert_eq!(table.ticker, "MSFT");
    assert_eq!(table.len(), 1);
}

#[tokio::test]
async fn price_tool_without_rows_is_tagged_failure() {
    let response = toolbox()
        .invoke_at(PRICES_TOOL, &json!({"ticker": "tsla", "days_ago": 30}), now())
        .await;

    assert_eq!(
        response,
        ToolResponse::Failure {
            kind: "not_found".to_string(),
            reason: "No price data found for ticker TSLA in the last 30 days to create DataFrame."
                .to_string(),
        }
    );
}

#[tokio::test]
async fn unknown_tool_is_not_found() {
    let response = toolbox().invoke_at("sell_everything", &json!({}), now()).await;
    assert!(response.is_failure());
    let ToolResponse::Failure { kind, .. } = response else {
        unreachable!()
    };
    assert_eq!(kind, "not_found");
}

#[test]
fn responses_serialize_with_type_tag() {
    let text = serde_json::to_value(ToolResponse::Text {
        text: "hi".to_string(),
    })
    .unwrap();
    assert_eq!(text, json!({"type": "text", "text": "hi"}));

    let failure = serde_json::to_value(ToolResponse::from(ServiceError::ConnectionFailure(
        "down".to_string(),
    )))
    .unwrap();
    assert_eq!(
        failure,
        json!({"type": "failure", "kind": "connection_failure", "reason": "down"})
    );
}
