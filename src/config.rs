use anyhow::{bail, Result};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Which backend fills a provider slot in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Google,
    Libre,
    OpenAi,
    /// Slot left empty; the chain skips straight to the next tier
    Disabled,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" => Ok(ProviderKind::Google),
            "libre" | "libretranslate" => Ok(ProviderKind::Libre),
            "openai" => Ok(ProviderKind::OpenAi),
            "none" | "disabled" | "" => Ok(ProviderKind::Disabled),
            other => bail!("Unknown translation provider: '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Provider selection
    pub primary_provider: ProviderKind,
    pub secondary_provider: ProviderKind,

    // Google Cloud Translation
    pub google_api_key: Option<String>,
    pub google_api_url: String,

    // LibreTranslate
    pub libre_api_url: String,
    pub libre_api_key: Option<String>,

    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,

    // Remote cache
    pub database_url: Option<String>,
    pub remote_cache_timeout: Duration,
    pub remote_cache_write_back: bool,

    // Tiers
    pub provider_timeout: Duration,
    pub memory_cache_capacity: usize,

    // Server
    pub api_key: Option<String>,
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Missing credentials never fail: the affected tier is disabled and a
    /// warning is logged so requests still degrade down the chain.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            primary_provider: provider_var("PRIMARY_PROVIDER", ProviderKind::Google),
            secondary_provider: provider_var("SECONDARY_PROVIDER", ProviderKind::Libre),

            google_api_key: optional_var("GOOGLE_TRANSLATE_API_KEY"),
            google_api_url: std::env::var("GOOGLE_TRANSLATE_API_URL").unwrap_or_else(|_| {
                "https://translation.googleapis.com/language/translate/v2".to_string()
            }),

            libre_api_url: std::env::var("LIBRETRANSLATE_URL")
                .unwrap_or_else(|_| "https://libretranslate.com/translate".to_string()),
            libre_api_key: optional_var("LIBRETRANSLATE_API_KEY"),

            openai_api_key: optional_var("OPENAI_API_KEY"),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),

            database_url: optional_var("DATABASE_URL"),
            remote_cache_timeout: Duration::from_millis(parsed_var(
                "REMOTE_CACHE_TIMEOUT_MS",
                3000,
            )),
            remote_cache_write_back: parsed_var("REMOTE_CACHE_WRITE_BACK", false),

            provider_timeout: Duration::from_millis(parsed_var("PROVIDER_TIMEOUT_MS", 10_000)),
            memory_cache_capacity: parsed_var("MEMORY_CACHE_CAPACITY", 5000),

            api_key: optional_var("API_KEY"),
            port: parsed_var("PORT", 8080),
        };

        config.warn_missing_credentials();
        Ok(config)
    }

    fn warn_missing_credentials(&self) {
        for (slot, kind) in [
            ("primary", self.primary_provider),
            ("secondary", self.secondary_provider),
        ] {
            match kind {
                ProviderKind::Google if self.google_api_key.is_none() => warn!(
                    "GOOGLE_TRANSLATE_API_KEY not set, {} provider will be skipped",
                    slot
                ),
                ProviderKind::OpenAi if self.openai_api_key.is_none() => warn!(
                    "OPENAI_API_KEY not set, {} provider will be skipped",
                    slot
                ),
                _ => {}
            }
        }

        if self.database_url.is_none() {
            warn!("DATABASE_URL not set, remote translation cache disabled");
        }
    }
}

/// Read a variable, treating empty values as unset
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed_var<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn provider_var(name: &str, default: ProviderKind) -> ProviderKind {
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|e| {
            warn!("{}: {}, using {:?}", name, e, default);
            default
        }),
        Err(_) => default,
    }
}
