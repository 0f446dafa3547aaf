mod api;
mod health;
mod middleware;

use std::sync::Arc;

use stockpulse_core::SqlIdentifier;
use stockpulse_search::SearchClient;
use stockpulse_tools::{PriceTable, SearchIndex, Toolbox};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    health::LiveHealth,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = stockpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = stockpulse_db::connect_pool_from_config(&config).await?;
    let search = Arc::new(SearchClient::from_app_config(&config)?);
    let table = SqlIdentifier::parse(&config.price_table)?;

    let toolbox = Toolbox::new(
        Arc::new(SearchIndex::new(Arc::clone(&search), config.article_index.clone())),
        Arc::new(PriceTable::new(pool.clone(), table)),
    );
    let app = build_app(AppState {
        toolbox,
        health: Arc::new(LiveHealth::new(pool, search)),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "tool server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
