//! Hybrid translation: a fallback chain over prebuilt strings, caches,
//! remote providers and a local mock.

mod cache;
mod google;
mod libre;
mod metrics;
mod mock;
mod openai;
mod orchestrator;
mod provider;
mod remote;
mod types;
mod ui;

pub use cache::{CacheKey, CachedTranslation, MemoryCache, KEY_PREFIX_CHARS};
pub use google::GoogleTranslator;
pub use libre::LibreTranslator;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use mock::{MockTranslation, MockTranslator};
pub use openai::OpenAiTranslator;
pub use orchestrator::{HybridTranslator, HybridTranslatorBuilder, ProviderTier};
pub use provider::TranslationProvider;
pub use remote::{
    truncate_chars, RemoteCache, RemoteCacheRow, StoreOutcome, SOURCE_TEXT_MAX_CHARS,
    TRANSLATED_TEXT_MAX_CHARS,
};
pub use types::{ContentType, ServiceTier, TierConfidence, TranslationRequest, TranslationResult};
pub use ui::{into_map, UiLabel, UiTranslation, UiTranslator};
