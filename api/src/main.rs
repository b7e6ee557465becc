use anyhow::Result;
use shared::{connect_and_migrate, Config, YahooFinanceClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod filters;
mod flash;
mod routes;
mod state;
mod templates;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting folio {}", templates::VERSION);

    let config = Config::from_env()?;
    let db = Arc::new(connect_and_migrate(&config.database_url).await?);
    info!("Connected to database");

    let provider = Arc::new(YahooFinanceClient::new(
        &config.market_data_base_url,
        config.market_data_timeout,
    )?);
    let state = AppState::new(db, provider, &config.exchange_rate_symbol);

    let static_dir = config
        .static_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")));
    info!("Serving static files from: {:?}", static_dir);

    let app = routes::create_router(state, &static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
