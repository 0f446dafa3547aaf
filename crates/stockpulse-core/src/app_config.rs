use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub search_url: String,
    pub search_api_key: Option<String>,
    pub search_user: Option<String>,
    pub search_password: Option<String>,
    pub article_index: String,
    pub price_table: String,
    pub translation_url: Option<String>,
    pub sentiment_url: Option<String>,
    pub inference_api_token: Option<String>,
    pub news_data_dir: PathBuf,
    pub stock_data_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub insert_chunk_size: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("search_url", &self.search_url)
            .field(
                "search_api_key",
                &self.search_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("search_user", &self.search_user)
            .field(
                "search_password",
                &self.search_password.as_ref().map(|_| "[redacted]"),
            )
            .field("article_index", &self.article_index)
            .field("price_table", &self.price_table)
            .field("translation_url", &self.translation_url)
            .field("sentiment_url", &self.sentiment_url)
            .field(
                "inference_api_token",
                &self.inference_api_token.as_ref().map(|_| "[redacted]"),
            )
            .field("news_data_dir", &self.news_data_dir)
            .field("stock_data_dir", &self.stock_data_dir)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("insert_chunk_size", &self.insert_chunk_size)
            .finish()
    }
}
