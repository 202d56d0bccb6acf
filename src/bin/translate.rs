//! One-shot translation through the full fallback chain
//!
//! Usage:
//!   cargo run --bin translate -- <from> <to> <text> [content_type]
//!   cargo run --bin translate -- en es "Breaking News" news
//!
//! Uses the same environment configuration as the service (provider keys,
//! DATABASE_URL, timeouts). content_type is one of ui, news, chat and
//! defaults to news. Prints the result as JSON.

use anyhow::{bail, Context, Result};
use news_translate::config::Config;
use news_translate::db::connect_remote_cache;
use news_translate::translation::{ContentType, HybridTranslator, TranslationRequest};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("news_translate=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        bail!("usage: translate <from> <to> <text> [content_type]");
    }

    let content_type = match args.get(3) {
        Some(raw) => raw.parse()?,
        None => ContentType::default(),
    };
    let request = TranslationRequest::new(args[2].as_str(), args[0].as_str(), args[1].as_str(), content_type);

    let config = Config::from_env()?;
    let client = reqwest::Client::builder()
        .timeout(config.provider_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let remote = connect_remote_cache(config.database_url.as_deref()).await;
    let translator = HybridTranslator::from_config(&config, &client, remote);

    info!("Translating {} → {} ({})", request.from, request.to, request.content_type);
    let result = translator.translate(&request).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
