//! Integration tests for `PriceCrawler` against a `wiremock` chart API.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stockpulse_ingest::{crawl_to_dir, parse_price_csv, IngestError, PriceCrawler};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn chart_body() -> serde_json::Value {
    json!({
        "chart": {
            "result": [{
                "meta": {"symbol": "MSFT", "currency": "USD"},
                "timestamp": [1_704_085_200, 1_706_763_600],
                "indicators": {"quote": [{
                    "open": [376.04, 402.56],
                    "high": [415.32, 420.82],
                    "low": [366.5, 397.22],
                    "close": [397.58, 413.64],
                    "volume": [528_399_000, 418_912_200]
                }]}
            }],
            "error": null
        }
    })
}

#[tokio::test]
async fn fetch_history_sends_range_and_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/MSFT"))
        .and(query_param("interval", "1mo"))
        .and(query_param("period1", "1704067200"))
        .and(query_param("period2", "1711929600"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .expect(1)
        .mount(&server)
        .await;

    let crawler = PriceCrawler::with_base_url(&server.uri(), 5).unwrap();
    let rows = crawler
        .fetch_history("msft", day(2024, 1, 1), day(2024, 4, 1), "1mo")
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ticker, "MSFT");
    assert_eq!(rows[1].date, day(2024, 2, 1));
    assert_eq!(rows[1].volume, 418_912_200);
}

#[tokio::test]
async fn chart_error_body_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "chart": {"result": null, "error": {
                "code": "Not Found",
                "description": "No data found, symbol may be delisted"
            }}
        })))
        .mount(&server)
        .await;

    let crawler = PriceCrawler::with_base_url(&server.uri(), 5).unwrap();
    let err = crawler
        .fetch_history("ZZZZ", day(2024, 1, 1), day(2024, 4, 1), "1mo")
        .await
        .unwrap_err();

    match err {
        IngestError::History { ticker, reason } => {
            assert_eq!(ticker, "ZZZZ");
            assert!(reason.contains("delisted"));
        }
        other => panic!("expected History error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_without_chart_body_is_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let crawler = PriceCrawler::with_base_url(&server.uri(), 5).unwrap();
    let err = crawler
        .fetch_history("MSFT", day(2024, 1, 1), day(2024, 4, 1), "1mo")
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::UnexpectedStatus { status: 502, .. }));
}

#[tokio::test]
async fn crawl_writes_one_readable_file_per_ticker_and_counts_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/MSFT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let crawler = PriceCrawler::with_base_url(&server.uri(), 5).unwrap();
    let tickers = vec!["MSFT".to_string(), "NOPE".to_string()];

    let summary = crawl_to_dir(
        &crawler,
        &tickers,
        day(2024, 1, 1),
        day(2024, 4, 1),
        "1mo",
        out.path(),
        false,
    )
    .await
    .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.written, vec![out.path().join("MSFT_1year_monthly.csv")]);

    let file = std::fs::File::open(&summary.written[0]).unwrap();
    let table = parse_price_csv(file, "MSFT").unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.dropped, 0);
}

#[tokio::test]
async fn dry_run_crawl_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body()))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("prices");
    let crawler = PriceCrawler::with_base_url(&server.uri(), 5).unwrap();

    let summary = crawl_to_dir(
        &crawler,
        &["MSFT".to_string()],
        day(2024, 1, 1),
        day(2024, 4, 1),
        "1mo",
        &target,
        true,
    )
    .await
    .unwrap();

    assert!(summary.written.is_empty());
    assert!(!target.exists());
}
