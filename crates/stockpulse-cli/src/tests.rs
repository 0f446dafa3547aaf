use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["stockpulse"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["stockpulse", "db", "ping"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_init_with_table() {
    let cli = Cli::try_parse_from(["stockpulse", "db", "init", "--table", "prices_2024"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Init { table: Some(ref t) }
        }) if t == "prices_2024"
    ));
}

#[test]
fn ingest_news_defaults_to_config() {
    let cli = Cli::try_parse_from(["stockpulse", "ingest", "news"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ingest {
            command: IngestCommands::News {
                dir: None,
                index: None,
                dry_run: false
            }
        })
    ));
}

#[test]
fn ingest_stocks_dry_run_with_dir() {
    let cli = Cli::try_parse_from([
        "stockpulse",
        "ingest",
        "stocks",
        "--dir",
        "/tmp/prices",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ingest {
            command: IngestCommands::Stocks {
                dir: Some(ref d),
                table: None,
                dry_run: true
            }
        }) if d == &PathBuf::from("/tmp/prices")
    ));
}

#[test]
fn fetch_prices_parses_tickers_and_range() {
    let cli = Cli::try_parse_from([
        "stockpulse",
        "fetch-prices",
        "NVDA",
        "MSFT",
        "--start",
        "2024-01-01",
        "--end",
        "2024-12-31",
    ])
    .unwrap();
    let Some(Commands::FetchPrices {
        tickers,
        start,
        end,
        interval,
        out_dir,
        dry_run,
    }) = cli.command
    else {
        panic!("expected fetch-prices");
    };
    assert_eq!(tickers, vec!["NVDA", "MSFT"]);
    assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    assert_eq!(interval, "1mo");
    assert!(out_dir.is_none());
    assert!(!dry_run);
}

#[test]
fn fetch_prices_requires_a_ticker() {
    let result = Cli::try_parse_from([
        "stockpulse",
        "fetch-prices",
        "--start",
        "2024-01-01",
        "--end",
        "2024-12-31",
    ]);
    assert!(result.is_err());
}

#[test]
fn fetch_prices_rejects_malformed_date() {
    let result = Cli::try_parse_from([
        "stockpulse",
        "fetch-prices",
        "NVDA",
        "--start",
        "01/01/2024",
        "--end",
        "2024-12-31",
    ]);
    assert!(result.is_err());
}

#[test]
fn tools_news_uses_defaults() {
    let cli = Cli::try_parse_from(["stockpulse", "tools", "news", "google"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Tools {
            command: ToolsCommands::News {
                ref company,
                days_ago: 7,
                max_results: 3
            }
        }) if company == "google"
    ));
}

#[test]
fn tools_prices_accepts_days_ago() {
    let cli =
        Cli::try_parse_from(["stockpulse", "tools", "prices", "MSFT", "--days-ago", "30"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Tools {
            command: ToolsCommands::Prices {
                ref ticker,
                days_ago: 30,
                json: false
            }
        }) if ticker == "MSFT"
    ));
}

#[test]
fn nlp_parse_date_takes_positional_value() {
    let cli = Cli::try_parse_from(["stockpulse", "nlp", "parse-date", "15/03/2024"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Nlp {
            command: NlpCommands::ParseDate { ref value }
        }) if value == "15/03/2024"
    ));
}

#[test]
fn nlp_translate_accepts_explicit_url() {
    let cli = Cli::try_parse_from([
        "stockpulse",
        "nlp",
        "translate",
        "Lợi nhuận tăng",
        "--url",
        "http://localhost:8080/translate",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Nlp {
            command: NlpCommands::Translate { ref text, ref url }
        }) if text == "Lợi nhuận tăng" && url == "http://localhost:8080/translate"
    ));
}
