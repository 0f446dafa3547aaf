use crate::app_config::{AppConfig, Environment};
use crate::identifier::is_sql_identifier;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset for optional values.
    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("STOCKPULSE_ENV", "development"))?;
    let bind_addr = parse_addr("STOCKPULSE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STOCKPULSE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("STOCKPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("STOCKPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("STOCKPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let search_url = or_default("ELASTICSEARCH_HOST", "http://localhost:9200");
    let search_api_key = optional("ELASTICSEARCH_API_KEY");
    let search_user = optional("ELASTICSEARCH_USER");
    let search_password = optional("ELASTICSEARCH_PASSWORD");
    let article_index = or_default("ARTICLE_INDEX_NAME", "news_data");

    let price_table = or_default("PRICE_TABLE_NAME", "stock_prices");
    if !is_sql_identifier(&price_table) {
        return Err(invalid(
            "PRICE_TABLE_NAME",
            format!("{price_table:?} is not a plain SQL identifier"),
        ));
    }

    let translation_url = optional("TRANSLATION_URL");
    let sentiment_url = optional("SENTIMENT_URL");
    let inference_api_token = optional("INFERENCE_API_TOKEN");

    let news_data_dir = PathBuf::from(or_default("STOCKPULSE_NEWS_DATA_DIR", "data/news_data"));
    let stock_data_dir =
        PathBuf::from(or_default("STOCKPULSE_STOCK_DATA_DIR", "data/stock_data"));

    let request_timeout_secs = parse_u64("STOCKPULSE_REQUEST_TIMEOUT_SECS", "30")?;
    let insert_chunk_size = parse_usize("STOCKPULSE_INSERT_CHUNK_SIZE", "1000")?;
    if insert_chunk_size == 0 {
        return Err(invalid(
            "STOCKPULSE_INSERT_CHUNK_SIZE",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        search_url,
        search_api_key,
        search_user,
        search_password,
        article_index,
        price_table,
        translation_url,
        sentiment_url,
        inference_api_token,
        news_data_dir,
        stock_data_dir,
        request_timeout_secs,
        insert_chunk_size,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOCKPULSE_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
