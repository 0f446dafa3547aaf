use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use stockpulse_core::{PricePoint, ServiceError};
use stockpulse_db::DbError;
use stockpulse_search::SearchHit;
use stockpulse_tools::{NewsSearch, PriceHistory};
use tower::ServiceExt;

use super::*;

struct OneArticle;

#[async_trait]
impl NewsSearch for OneArticle {
    async fn search_news(&self, _query: &Value, _size: usize) -> Result<Vec<SearchHit>, ServiceError> {
        Ok(vec![SearchHit {
            id: "a1".to_string(),
            index: "news_data".to_string(),
            score: None,
            source: json!({
                "title_en": "Profit rises",
                "content_en": "Body",
                "publish_date": "2024-03-15T00:00:00+00:00"
            }),
        }])
    }
}

struct MsftOnly;

#[async_trait]
impl PriceHistory for MsftOnly {
    async fn prices_since(&self, ticker: &str, _since: NaiveDate) -> Result<Vec<PricePoint>, DbError> {
        if ticker != "MSFT" {
            return Ok(Vec::new());
        }
        Ok(vec![PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            open: Decimal::new(40_000, 2),
            high: Decimal::new(41_000, 2),
            low: Decimal::new(39_000, 2),
            close: Decimal::new(40_500, 2),
            volume: 1_000,
        }])
    }
}

struct FixedHealth {
    database: bool,
    search: bool,
}

#[async_trait]
impl HealthProbe for FixedHealth {
    async fn database(&self) -> Result<(), ServiceError> {
        if self.database {
            Ok(())
        } else {
            Err(ServiceError::ConnectionFailure("pool timed out".to_string()))
        }
    }

    async fn search(&self) -> Result<(), ServiceError> {
        if self.search {
            Ok(())
        } else {
            Err(ServiceError::ConnectionFailure("connection refused".to_string()))
        }
    }
}

fn app_with_health(database: bool, search: bool) -> Router {
    build_app(AppState {
        toolbox: Toolbox::new(Arc::new(OneArticle), Arc::new(MsftOnly)),
        health: Arc::new(FixedHealth { database, search }),
    })
}

fn app() -> Router {
    app_with_health(true, true)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

// ---------------------------------------------------------------------------
// health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_ok_when_both_backends_answer() {
    let (status, json) = send(app(), get_req("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["data"],
        json!({"status": "ok", "database": "ok", "search": "ok"})
    );
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn health_is_degraded_when_search_is_down() {
    let (status, json) = send(app_with_health(true, false), get_req("/api/v1/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["data"]["status"], "degraded");
    assert_eq!(json["data"]["database"], "ok");
    assert_eq!(json["data"]["search"], "unavailable");
}

// ---------------------------------------------------------------------------
// tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tools_are_listed() {
    let (status, json) = send(app(), get_req("/api/v1/tools")).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(
        names,
        vec!["retrieve_news_articles", "retrieve_stock_prices_dataframe"]
    );
}

#[tokio::test]
async fn news_tool_answers_with_text() {
    let (status, json) = send(
        app(),
        post(
            "/api/v1/tools/retrieve_news_articles",
            r#"{"company_name": "acme"}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["type"], "text");
    let text = json["data"]["text"].as_str().expect("text");
    assert!(text.starts_with("Article 1:\n  ID: a1\n  Title: Profit rises"));
}

#[tokio::test]
async fn price_tool_answers_with_table() {
    let (status, json) = send(
        app(),
        post("/api/v1/tools/retrieve_stock_prices_dataframe", r#"{"ticker": "msft"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["type"], "table");
    assert_eq!(json["data"]["table"]["ticker"], "MSFT");
    assert_eq!(
        json["data"]["table"]["columns"],
        json!(["date", "open", "high", "low", "close", "volume"])
    );
}

#[tokio::test]
async fn price_tool_without_data_is_404() {
    let (status, json) = send(
        app(),
        post(
            "/api/v1/tools/retrieve_stock_prices_dataframe",
            r#"{"ticker": "tsla", "days_ago": 30}"#,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(
        json["error"]["message"],
        "No price data found for ticker TSLA in the last 30 days to create DataFrame."
    );
}

#[tokio::test]
async fn missing_required_argument_is_400() {
    let (status, json) = send(
        app(),
        post("/api/v1/tools/retrieve_stock_prices_dataframe", ""),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_failure");
}

#[tokio::test]
async fn malformed_body_is_400() {
    let (status, json) = send(
        app(),
        post("/api/v1/tools/retrieve_news_articles", "{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn unknown_tool_is_404() {
    let (status, json) = send(app(), post("/api/v1/tools/sell_everything", "{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["message"], "unknown tool: sell_everything");
}

#[test]
fn connection_failure_maps_to_service_unavailable() {
    let response = ApiError::new("req-1", "connection_failure", "down").into_response();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
