use anyhow::{Context, Result};
use news_translate::config::Config;
use news_translate::db::connect_remote_cache;
use news_translate::server::{self, AppState};
use news_translate::translation::HybridTranslator;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("news_translate=info".parse()?),
        )
        .init();

    info!("Starting translation service");

    let config = Config::from_env()?;

    let client = reqwest::Client::builder()
        .timeout(config.provider_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let remote = connect_remote_cache(config.database_url.as_deref()).await;
    let translator = Arc::new(HybridTranslator::from_config(&config, &client, remote));
    let state = AppState::new(translator, config.api_key.clone());

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .context(format!("Failed to bind port {}", config.port))?;

    server::serve(listener, state).await
}
