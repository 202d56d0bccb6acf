//! The translation fallback chain.
//!
//! Resolution order for one request, first success wins:
//!
//! 1. passthrough when source and target language match
//! 2. prebuilt UI strings (UI content only)
//! 3. in-memory cache
//! 4. remote cache table
//! 5. each configured provider tier, in order
//! 6. local mock (never fails)
//!
//! Tiers are tried strictly one after another so a cache hit never costs a
//! provider call. Every result from tier 4 onwards is written back to the
//! in-memory cache.

use crate::config::{Config, ProviderKind};
use crate::i18n::{LanguageCode, PrebuiltTranslations, TranslationValidator};
use crate::translation::{
    CacheKey, CachedTranslation, ContentType, GoogleTranslator, LibreTranslator, MemoryCache, MetricsReport,
    MockTranslator, OpenAiTranslator, RemoteCache, RemoteCacheRow, ServiceTier, StoreOutcome,
    TierConfidence, TranslationMetrics, TranslationProvider, TranslationRequest,
    TranslationResult,
};
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// One provider slot in the chain
#[derive(Clone)]
pub struct ProviderTier {
    pub service: ServiceTier,
    pub provider: Arc<dyn TranslationProvider>,
}

pub struct HybridTranslator {
    prebuilt: PrebuiltTranslations,
    memory: MemoryCache,
    remote: Option<Arc<dyn RemoteCache>>,
    tiers: Vec<ProviderTier>,
    mock: MockTranslator,
    confidence: TierConfidence,
    provider_timeout: Duration,
    remote_timeout: Duration,
    write_back: bool,
    metrics: TranslationMetrics,
}

pub struct HybridTranslatorBuilder {
    memory_capacity: usize,
    remote: Option<Arc<dyn RemoteCache>>,
    tiers: Vec<ProviderTier>,
    mock: MockTranslator,
    confidence: TierConfidence,
    provider_timeout: Duration,
    remote_timeout: Duration,
    write_back: bool,
}

impl Default for HybridTranslatorBuilder {
    fn default() -> Self {
        Self {
            memory_capacity: 5000,
            remote: None,
            tiers: Vec::new(),
            mock: MockTranslator::builtin(),
            confidence: TierConfidence::default(),
            provider_timeout: Duration::from_secs(10),
            remote_timeout: Duration::from_secs(3),
            write_back: false,
        }
    }
}

impl HybridTranslatorBuilder {
    pub fn memory_capacity(mut self, capacity: usize) -> Self {
        self.memory_capacity = capacity;
        self
    }

    pub fn remote_cache(mut self, remote: Arc<dyn RemoteCache>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Append a provider to the end of the chain.
    pub fn provider(mut self, service: ServiceTier, provider: Arc<dyn TranslationProvider>) -> Self {
        self.tiers.push(ProviderTier { service, provider });
        self
    }

    pub fn primary(self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.provider(ServiceTier::PrimaryProvider, provider)
    }

    pub fn secondary(self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.provider(ServiceTier::SecondaryProvider, provider)
    }

    pub fn provider_timeout(mut self, duration: Duration) -> Self {
        self.provider_timeout = duration;
        self
    }

    pub fn remote_timeout(mut self, duration: Duration) -> Self {
        self.remote_timeout = duration;
        self
    }

    /// Persist provider results to the remote cache as well.
    pub fn write_back(mut self, enabled: bool) -> Self {
        self.write_back = enabled;
        self
    }

    pub fn build(self) -> HybridTranslator {
        HybridTranslator {
            prebuilt: PrebuiltTranslations::builtin(),
            memory: MemoryCache::new(self.memory_capacity),
            remote: self.remote,
            tiers: self.tiers,
            mock: self.mock,
            confidence: self.confidence,
            provider_timeout: self.provider_timeout,
            remote_timeout: self.remote_timeout,
            write_back: self.write_back,
            metrics: TranslationMetrics::new(),
        }
    }
}

/// Provider for a configured slot, or `None` when the slot is disabled or
/// lacks credentials.
fn provider_for(
    kind: ProviderKind,
    config: &Config,
    client: &reqwest::Client,
) -> Option<Arc<dyn TranslationProvider>> {
    match kind {
        ProviderKind::Google => config.google_api_key.as_deref().map(|key| {
            Arc::new(GoogleTranslator::new(client.clone(), &config.google_api_url, key))
                as Arc<dyn TranslationProvider>
        }),
        ProviderKind::Libre => Some(Arc::new(LibreTranslator::new(
            client.clone(),
            &config.libre_api_url,
            config.libre_api_key.as_deref(),
        ))),
        ProviderKind::OpenAi => config.openai_api_key.as_deref().map(|key| {
            Arc::new(OpenAiTranslator::new(
                client.clone(),
                &config.openai_api_url,
                key,
                &config.openai_model,
            )) as Arc<dyn TranslationProvider>
        }),
        ProviderKind::Disabled => None,
    }
}

impl HybridTranslator {
    pub fn builder() -> HybridTranslatorBuilder {
        HybridTranslatorBuilder::default()
    }

    /// Assemble the chain described by `config`.
    pub fn from_config(
        config: &Config,
        client: &reqwest::Client,
        remote: Option<Arc<dyn RemoteCache>>,
    ) -> Self {
        let mut builder = Self::builder()
            .memory_capacity(config.memory_cache_capacity)
            .provider_timeout(config.provider_timeout)
            .remote_timeout(config.remote_cache_timeout)
            .write_back(config.remote_cache_write_back);

        if let Some(remote) = remote {
            builder = builder.remote_cache(remote);
        }
        if let Some(primary) = provider_for(config.primary_provider, config, client) {
            builder = builder.primary(primary);
        }
        if let Some(secondary) = provider_for(config.secondary_provider, config, client) {
            builder = builder.secondary(secondary);
        }

        let translator = builder.build();
        info!(
            "Translation chain: {}",
            translator
                .tiers
                .iter()
                .map(|t| format!("{}={}", t.service, t.provider.name()))
                .chain(std::iter::once("mock".to_string()))
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        translator
    }

    pub fn prebuilt(&self) -> &PrebuiltTranslations {
        &self.prebuilt
    }

    pub fn memory_cache(&self) -> &MemoryCache {
        &self.memory
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }

    /// Convenience wrapper around [`HybridTranslator::translate`].
    pub async fn translate_text(
        &self,
        text: &str,
        from: &str,
        to: &str,
        content_type: ContentType,
    ) -> TranslationResult {
        self.translate(&TranslationRequest::new(text, from, to, content_type))
            .await
    }

    /// Resolve a request through the chain. Never fails: the mock tier
    /// always produces a string.
    pub async fn translate(&self, request: &TranslationRequest) -> TranslationResult {
        if let Some(result) = self.resolve_local(request) {
            return result;
        }

        if let Some(result) = self.lookup_remote(request).await {
            return result;
        }
        self.metrics.record_cache_miss();

        for tier in &self.tiers {
            let call = tier
                .provider
                .translate(&request.text, &request.from, &request.to);
            let Some(translated) = self.call_provider(tier, request, call).await else {
                continue;
            };
            if self.passes_validation(tier, request, &translated) {
                return self.accept_provider_result(tier.service, request, translated);
            }
            self.metrics.record_provider_failure();
        }

        self.mock_result(request)
    }

    /// Answer a request without any network activity, if possible:
    /// passthrough, prebuilt string, or in-memory cache.
    pub fn resolve_local(&self, request: &TranslationRequest) -> Option<TranslationResult> {
        if request.is_passthrough() {
            self.metrics.record_served(ServiceTier::None);
            return Some(TranslationResult::passthrough(request.text.clone()));
        }

        if request.content_type == ContentType::Ui {
            if let Some(text) =
                self.prebuilt
                    .lookup_text(&request.text, request.from.as_str(), request.to.as_str())
            {
                return Some(self.prebuilt_result(text));
            }
        }

        let key = self.key_for(request);
        self.memory.get(&key).map(|hit| {
            self.metrics.record_memory_hit();
            // Mock output keeps its tier and confidence when read back
            let (service, confidence) = match hit.origin {
                ServiceTier::Mock => (ServiceTier::Mock, hit.confidence),
                _ => (ServiceTier::Cache, self.confidence.cache),
            };
            TranslationResult {
                translated_text: hit.text,
                service,
                cached: true,
                confidence,
            }
        })
    }

    /// Result for a prebuilt string
    pub fn prebuilt_result(&self, text: &str) -> TranslationResult {
        self.metrics.record_served(ServiceTier::Prebuilt);
        TranslationResult {
            translated_text: text.to_string(),
            service: ServiceTier::Prebuilt,
            cached: true,
            confidence: self.confidence.prebuilt,
        }
    }

    /// Translate many texts that share languages and content type.
    ///
    /// Local hits are answered first, then remote-cache lookups run
    /// concurrently, then each provider tier gets a single batch call for
    /// whatever is still missing. Output order matches `texts`.
    pub async fn translate_many(
        &self,
        texts: &[String],
        from: &LanguageCode,
        to: &LanguageCode,
        content_type: ContentType,
    ) -> Vec<TranslationResult> {
        self.translate_many_tracked(texts, from, to, content_type, None)
            .await
    }

    /// [`HybridTranslator::translate_many`], incrementing `in_flight` for
    /// exactly as long as a provider batch call is outstanding.
    pub async fn translate_many_tracked(
        &self,
        texts: &[String],
        from: &LanguageCode,
        to: &LanguageCode,
        content_type: ContentType,
        in_flight: Option<&AtomicUsize>,
    ) -> Vec<TranslationResult> {
        let requests: Vec<TranslationRequest> = texts
            .iter()
            .map(|text| TranslationRequest::new(text.clone(), from.clone(), to.clone(), content_type))
            .collect();

        let mut results: Vec<Option<TranslationResult>> =
            requests.iter().map(|r| self.resolve_local(r)).collect();

        let pending: Vec<usize> = (0..requests.len()).filter(|&i| results[i].is_none()).collect();
        let remote_hits = join_all(pending.iter().map(|&i| self.lookup_remote(&requests[i]))).await;
        for (&i, hit) in pending.iter().zip(remote_hits) {
            if hit.is_none() {
                self.metrics.record_cache_miss();
            }
            results[i] = hit;
        }

        // Unique texts still unresolved, in first-seen order
        let mut unresolved: Vec<String> = Vec::new();
        let mut positions: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, request) in requests.iter().enumerate() {
            if results[i].is_none() {
                let slots = positions.entry(request.text.clone()).or_default();
                if slots.is_empty() {
                    unresolved.push(request.text.clone());
                }
                slots.push(i);
            }
        }

        if !unresolved.is_empty() {
            debug!(
                "Batch {}->{}: {} of {} texts need a provider",
                from,
                to,
                unresolved.len(),
                texts.len()
            );
        }

        let mut remaining = unresolved;
        for tier in &self.tiers {
            if remaining.is_empty() {
                break;
            }

            let first = &requests[positions[&remaining[0]][0]];
            let batch = {
                let _loading = in_flight.map(InFlightGuard::start);
                self.call_provider(tier, first, tier.provider.translate_batch(&remaining, from, to))
                    .await
            };

            let Some(translations) = batch else { continue };
            if translations.len() != remaining.len() {
                warn!(
                    "{} returned {} translations for {} texts, skipping tier",
                    tier.provider.name(),
                    translations.len(),
                    remaining.len()
                );
                self.metrics.record_provider_failure();
                continue;
            }

            let mut still_missing = Vec::new();
            for (text, translated) in remaining.into_iter().zip(translations) {
                let request = &requests[positions[&text][0]];
                if !self.passes_validation(tier, request, &translated) {
                    still_missing.push(text);
                    continue;
                }
                let result = self.accept_provider_result(tier.service, request, translated);
                for &i in &positions[&text] {
                    results[i] = Some(result.clone());
                }
            }
            // One failure per tier attempt, however many items it rejected
            if !still_missing.is_empty() {
                self.metrics.record_provider_failure();
            }
            remaining = still_missing;
        }

        for text in remaining {
            let slots = &positions[&text];
            let result = self.mock_result(&requests[slots[0]]);
            for &i in slots {
                results[i] = Some(result.clone());
            }
        }

        results
            .into_iter()
            .zip(&requests)
            .map(|(result, request)| result.unwrap_or_else(|| self.mock_result(request)))
            .collect()
    }

    fn key_for(&self, request: &TranslationRequest) -> CacheKey {
        CacheKey::new(&request.text, &request.from, &request.to, request.content_type)
    }

    async fn lookup_remote(&self, request: &TranslationRequest) -> Option<TranslationResult> {
        let remote = self.remote.as_ref()?;

        let lookup = remote.lookup(&request.text, &request.from, &request.to, request.content_type);
        let translated = match timeout(self.remote_timeout, lookup).await {
            Ok(Ok(Some(translated))) => translated,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                warn!("Remote translation cache lookup failed: {:#}", e);
                self.metrics.record_remote_failure();
                return None;
            }
            Err(_) => {
                warn!(
                    "Remote translation cache lookup timed out after {:?}",
                    self.remote_timeout
                );
                self.metrics.record_remote_failure();
                return None;
            }
        };

        self.metrics.record_remote_hit();
        self.memory.insert(
            self.key_for(request),
            CachedTranslation::new(translated.clone(), ServiceTier::Cache, self.confidence.cache),
        );
        Some(TranslationResult {
            translated_text: translated,
            service: ServiceTier::Cache,
            cached: true,
            confidence: self.confidence.cache,
        })
    }

    /// Run one provider call under the tier timeout. Any failure is logged
    /// and reported as `None` so the caller moves to the next tier.
    async fn call_provider<T, F>(
        &self,
        tier: &ProviderTier,
        request: &TranslationRequest,
        call: F,
    ) -> Option<T>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        self.metrics.record_provider_call();

        let outcome = match timeout(self.provider_timeout, call).await {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => format!("{:#}", e),
            Err(_) => format!("timed out after {:?}", self.provider_timeout),
        };

        self.metrics.record_provider_failure();
        warn!(
            "{} ({}) failed for {}->{} {}: {}",
            tier.service,
            tier.provider.name(),
            request.from,
            request.to,
            request.content_type,
            outcome
        );
        None
    }

    fn passes_validation(&self, tier: &ProviderTier, request: &TranslationRequest, translated: &str) -> bool {
        let report = TranslationValidator::validate(&request.text, translated);
        if report.has_errors() {
            warn!(
                "{} ({}) output rejected for {}->{}: {:?}",
                tier.service,
                tier.provider.name(),
                request.from,
                request.to,
                report.errors
            );
            return false;
        }
        if report.has_warnings() {
            warn!(
                "{} ({}) output for {}->{} has warnings: {:?}",
                tier.service,
                tier.provider.name(),
                request.from,
                request.to,
                report.warnings
            );
        }
        true
    }

    fn accept_provider_result(
        &self,
        service: ServiceTier,
        request: &TranslationRequest,
        translated: String,
    ) -> TranslationResult {
        let confidence = self.confidence.for_tier(service);
        self.memory.insert(
            self.key_for(request),
            CachedTranslation::new(translated.clone(), service, confidence),
        );
        self.metrics.record_served(service);
        self.spawn_write_back(request, &translated);

        TranslationResult {
            translated_text: translated,
            service,
            cached: false,
            confidence,
        }
    }

    fn mock_result(&self, request: &TranslationRequest) -> TranslationResult {
        let mock = self.mock.translate(&request.text, &request.to);
        let confidence = if mock.substituted {
            self.confidence.mock
        } else {
            self.confidence.mock_passthrough
        };
        self.memory.insert(
            self.key_for(request),
            CachedTranslation::new(mock.text.clone(), ServiceTier::Mock, confidence),
        );
        self.metrics.record_served(ServiceTier::Mock);
        debug!(
            "Mock translation for {}->{} (substituted: {})",
            request.from, request.to, mock.substituted
        );

        TranslationResult {
            translated_text: mock.text,
            service: ServiceTier::Mock,
            cached: false,
            confidence,
        }
    }

    fn spawn_write_back(&self, request: &TranslationRequest, translated: &str) {
        if !self.write_back {
            return;
        }
        let Some(remote) = self.remote.clone() else {
            return;
        };

        let row = RemoteCacheRow::new(
            &request.text,
            &request.from,
            &request.to,
            request.content_type,
            translated,
        );
        tokio::spawn(async move {
            match remote.store(row).await {
                Ok(StoreOutcome::Inserted) => debug!("Stored translation in remote cache"),
                Ok(StoreOutcome::AlreadyPresent) => {
                    debug!("Remote cache already had this translation")
                }
                Err(e) => warn!("Failed to store translation in remote cache: {:#}", e),
            }
        });
    }
}

/// Holds an in-flight count up for the lifetime of one provider call,
/// including when the call's future is dropped
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for HybridTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridTranslator")
            .field(
                "tiers",
                &self
                    .tiers
                    .iter()
                    .map(|t| (t.service, t.provider.name()))
                    .collect::<Vec<_>>(),
            )
            .field("remote_cache", &self.remote.is_some())
            .field("memory", &self.memory)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::sync::Mutex;

    #[derive(Clone, Copy)]
    enum Behavior {
        Prefix(&'static str),
        Fail,
        Empty,
        Slow(Duration),
    }

    struct FakeProvider {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
        batch_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
                batch_calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn batch_calls(&self) -> usize {
            self.batch_calls.load(Ordering::SeqCst)
        }

        async fn reply(&self, text: &str) -> anyhow::Result<String> {
            match self.behavior {
                Behavior::Prefix(prefix) => Ok(format!("{} {}", prefix, text)),
                Behavior::Fail => bail!("{} API error (503 Service Unavailable): down", self.name),
                Behavior::Empty => Ok(String::new()),
                Behavior::Slow(delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(format!("slow {}", text))
                }
            }
        }
    }

    impl TranslationProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn translate<'a>(
            &'a self,
            text: &'a str,
            _from: &'a LanguageCode,
            _to: &'a LanguageCode,
        ) -> BoxFuture<'a, anyhow::Result<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply(text).boxed()
        }

        fn translate_batch<'a>(
            &'a self,
            texts: &'a [String],
            _from: &'a LanguageCode,
            _to: &'a LanguageCode,
        ) -> BoxFuture<'a, anyhow::Result<Vec<String>>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            async move {
                let mut out = Vec::new();
                for text in texts {
                    out.push(self.reply(text).await?);
                }
                Ok(out)
            }
            .boxed()
        }
    }

    #[derive(Default)]
    struct FakeRemote {
        rows: Mutex<HashMap<(String, String, String, ContentType), String>>,
        stored: Mutex<Vec<RemoteCacheRow>>,
        lookups: AtomicUsize,
        fail: bool,
        delay: Option<Duration>,
    }

    impl FakeRemote {
        fn with_row(self, text: &str, from: &str, to: &str, content_type: ContentType, value: &str) -> Self {
            self.rows.lock().unwrap().insert(
                (text.to_string(), from.to_string(), to.to_string(), content_type),
                value.to_string(),
            );
            self
        }
    }

    impl RemoteCache for FakeRemote {
        fn lookup<'a>(
            &'a self,
            source_text: &'a str,
            from: &'a LanguageCode,
            to: &'a LanguageCode,
            content_type: ContentType,
        ) -> BoxFuture<'a, anyhow::Result<Option<String>>> {
            async move {
                self.lookups.fetch_add(1, Ordering::SeqCst);
                if let Some(delay) = self.delay {
                    tokio::time::sleep(delay).await;
                }
                if self.fail {
                    bail!("connection reset");
                }
                Ok(self
                    .rows
                    .lock()
                    .unwrap()
                    .get(&(
                        source_text.to_string(),
                        from.to_string(),
                        to.to_string(),
                        content_type,
                    ))
                    .cloned())
            }
            .boxed()
        }

        fn store(&self, row: RemoteCacheRow) -> BoxFuture<'_, anyhow::Result<StoreOutcome>> {
            async move {
                self.stored.lock().unwrap().push(row);
                Ok(StoreOutcome::Inserted)
            }
            .boxed()
        }
    }

    fn chain(primary: Behavior, secondary: Behavior) -> (HybridTranslator, Arc<FakeProvider>, Arc<FakeProvider>) {
        let p = FakeProvider::new("primary", primary);
        let s = FakeProvider::new("secondary", secondary);
        let translator = HybridTranslator::builder()
            .primary(p.clone())
            .secondary(s.clone())
            .provider_timeout(Duration::from_millis(100))
            .build();
        (translator, p, s)
    }

    #[tokio::test]
    async fn test_same_language_is_passthrough_without_calls() {
        let (translator, p, s) = chain(Behavior::Prefix("P"), Behavior::Prefix("S"));

        let result = translator
            .translate_text("Hello world", "es", "es", ContentType::News)
            .await;

        assert_eq!(result, TranslationResult::passthrough("Hello world"));
        assert_eq!(p.calls() + s.calls(), 0);
        assert!(translator.memory_cache().is_empty());
    }

    #[tokio::test]
    async fn test_prebuilt_ui_label_needs_no_network() {
        let (translator, p, _) = chain(Behavior::Fail, Behavior::Fail);

        let result = translator
            .translate_text("Sign In", "en", "es", ContentType::Ui)
            .await;

        assert_eq!(result.translated_text, "Iniciar Sesión");
        assert_eq!(result.service, ServiceTier::Prebuilt);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(p.calls(), 0);
    }

    #[tokio::test]
    async fn test_prebuilt_only_applies_to_ui_content() {
        let (translator, p, _) = chain(Behavior::Prefix("P"), Behavior::Fail);

        let result = translator
            .translate_text("Sign In", "en", "es", ContentType::Chat)
            .await;

        assert_eq!(result.service, ServiceTier::PrimaryProvider);
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test]
    async fn test_primary_result_is_cached_for_next_call() {
        let (translator, p, _) = chain(Behavior::Prefix("P"), Behavior::Prefix("S"));

        let first = translator
            .translate_text("Markets rally", "en", "de", ContentType::News)
            .await;
        let second = translator
            .translate_text("Markets rally", "en", "de", ContentType::News)
            .await;

        assert_eq!(first.service, ServiceTier::PrimaryProvider);
        assert_eq!(first.confidence, 0.95);
        assert!(!first.cached);
        assert_eq!(second.service, ServiceTier::Cache);
        assert!(second.cached);
        assert_eq!(first.translated_text, second.translated_text);
        assert_eq!(p.calls(), 1);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_secondary() {
        let (translator, p, s) = chain(Behavior::Fail, Behavior::Prefix("S"));

        let result = translator
            .translate_text("Markets rally", "en", "de", ContentType::News)
            .await;

        assert_eq!(result.service, ServiceTier::SecondaryProvider);
        assert_eq!(result.translated_text, "S Markets rally");
        assert_eq!(result.confidence, 0.92);
        assert_eq!((p.calls(), s.calls()), (1, 1));
        assert_eq!(translator.metrics().provider_failures, 1);
    }

    #[tokio::test]
    async fn test_all_providers_failing_reaches_mock() {
        let (translator, _, _) = chain(Behavior::Fail, Behavior::Fail);

        let result = translator
            .translate_text("Breaking News", "en", "xx", ContentType::News)
            .await;

        assert_eq!(result.service, ServiceTier::Mock);
        assert_eq!(result.translated_text, "[XX] Breaking News");
        assert_eq!(result.confidence, 0.6);
    }

    #[tokio::test]
    async fn test_mock_with_table_has_higher_confidence() {
        let (translator, _, _) = chain(Behavior::Fail, Behavior::Fail);

        let result = translator
            .translate_text("Breaking News", "en", "es", ContentType::News)
            .await;

        assert_eq!(result.service, ServiceTier::Mock);
        assert_eq!(result.translated_text, "Última hora");
        assert_eq!(result.confidence, 0.7);
    }

    #[tokio::test]
    async fn test_slow_provider_times_out_and_falls_back() {
        let (translator, _, s) = chain(Behavior::Slow(Duration::from_secs(5)), Behavior::Prefix("S"));

        let result = translator
            .translate_text("Storm warning", "en", "fr", ContentType::News)
            .await;

        assert_eq!(result.service, ServiceTier::SecondaryProvider);
        assert_eq!(s.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_provider_output_is_rejected() {
        let (translator, _, _) = chain(Behavior::Empty, Behavior::Prefix("S"));

        let result = translator
            .translate_text("Storm warning", "en", "fr", ContentType::News)
            .await;

        assert_eq!(result.service, ServiceTier::SecondaryProvider);
    }

    #[tokio::test]
    async fn test_no_providers_configured_uses_mock() {
        let translator = HybridTranslator::builder().build();

        let result = translator
            .translate_text("Police report", "en", "it", ContentType::News)
            .await;

        assert_eq!(result.service, ServiceTier::Mock);
        assert_eq!(result.translated_text, "Polizia rapporto");
    }

    #[tokio::test]
    async fn test_remote_hit_skips_providers_and_warms_memory() {
        let p = FakeProvider::new("primary", Behavior::Prefix("P"));
        let remote = Arc::new(FakeRemote::default().with_row(
            "Election results",
            "en",
            "es",
            ContentType::News,
            "Resultados electorales",
        ));
        let translator = HybridTranslator::builder()
            .primary(p.clone())
            .remote_cache(remote.clone())
            .build();

        let first = translator
            .translate_text("Election results", "en", "es", ContentType::News)
            .await;
        let second = translator
            .translate_text("Election results", "en", "es", ContentType::News)
            .await;

        assert_eq!(first.service, ServiceTier::Cache);
        assert_eq!(first.translated_text, "Resultados electorales");
        assert_eq!(second.translated_text, "Resultados electorales");
        assert_eq!(remote.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(p.calls(), 0);
        assert_eq!(translator.metrics().remote_hits, 1);
        assert_eq!(translator.metrics().memory_hits, 1);
    }

    #[tokio::test]
    async fn test_remote_failure_and_timeout_fall_through() {
        for remote in [
            FakeRemote {
                fail: true,
                ..Default::default()
            },
            FakeRemote {
                delay: Some(Duration::from_secs(5)),
                ..Default::default()
            },
        ] {
            let translator = HybridTranslator::builder()
                .primary(FakeProvider::new("primary", Behavior::Prefix("P")))
                .remote_cache(Arc::new(remote))
                .remote_timeout(Duration::from_millis(50))
                .build();

            let result = translator
                .translate_text("Flood alert", "en", "pt", ContentType::News)
                .await;

            assert_eq!(result.service, ServiceTier::PrimaryProvider);
            assert_eq!(translator.metrics().remote_failures, 1);
        }
    }

    #[tokio::test]
    async fn test_write_back_stores_provider_results_only() {
        let remote = Arc::new(FakeRemote::default());
        let translator = HybridTranslator::builder()
            .primary(FakeProvider::new("primary", Behavior::Prefix("P")))
            .remote_cache(remote.clone())
            .write_back(true)
            .build();

        translator
            .translate_text("Flood alert", "en", "pt", ContentType::News)
            .await;
        // Let the spawned write finish
        tokio::time::sleep(Duration::from_millis(20)).await;

        let stored = remote.stored.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].translated_text, "P Flood alert");
        assert_eq!(stored[0].target_language.as_str(), "pt");
    }

    #[tokio::test]
    async fn test_no_write_back_by_default() {
        let remote = Arc::new(FakeRemote::default());
        let translator = HybridTranslator::builder()
            .primary(FakeProvider::new("primary", Behavior::Prefix("P")))
            .remote_cache(remote.clone())
            .build();

        translator
            .translate_text("Flood alert", "en", "pt", ContentType::News)
            .await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(remote.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_translate_many_preserves_order_and_dedupes() {
        let (translator, p, _) = chain(Behavior::Prefix("P"), Behavior::Fail);
        let texts: Vec<String> = ["Alpha", "Sign In", "Beta", "Alpha"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let results = translator
            .translate_many(&texts, &"en".into(), &"es".into(), ContentType::Ui)
            .await;

        let out: Vec<_> = results.iter().map(|r| r.translated_text.as_str()).collect();
        assert_eq!(out, vec!["P Alpha", "Iniciar Sesión", "P Beta", "P Alpha"]);
        assert_eq!(results[1].service, ServiceTier::Prebuilt);
        assert_eq!(p.batch_calls(), 1);
        assert_eq!(p.calls(), 0);
    }

    #[tokio::test]
    async fn test_translate_many_falls_back_per_tier() {
        let (translator, p, s) = chain(Behavior::Fail, Behavior::Fail);
        let texts = vec!["Breaking News".to_string(), "Weather".to_string()];

        let results = translator
            .translate_many(&texts, &"en".into(), &"zz".into(), ContentType::News)
            .await;

        assert_eq!(results[0].translated_text, "[ZZ] Breaking News");
        assert_eq!(results[1].translated_text, "[ZZ] Weather");
        assert!(results.iter().all(|r| r.service == ServiceTier::Mock));
        assert_eq!((p.batch_calls(), s.batch_calls()), (1, 1));
    }

    #[tokio::test]
    async fn test_translate_many_skips_provider_when_all_local() {
        let (translator, p, _) = chain(Behavior::Prefix("P"), Behavior::Fail);
        translator
            .translate_text("Gamma", "en", "fr", ContentType::Ui)
            .await;

        let texts = vec!["Gamma".to_string(), "Home".to_string()];
        let results = translator
            .translate_many(&texts, &"en".into(), &"fr".into(), ContentType::Ui)
            .await;

        assert_eq!(results[0].service, ServiceTier::Cache);
        assert_eq!(results[1].translated_text, "Accueil");
        assert_eq!(p.batch_calls(), 0);
    }

    #[tokio::test]
    async fn test_cached_mock_output_is_still_reported_as_mock() {
        let (translator, p, s) = chain(Behavior::Fail, Behavior::Fail);

        let first = translator
            .translate_text("Breaking News", "en", "xx", ContentType::News)
            .await;
        let second = translator
            .translate_text("Breaking News", "en", "xx", ContentType::News)
            .await;

        assert_eq!(first.service, ServiceTier::Mock);
        assert!(!first.cached);
        assert_eq!(second.translated_text, "[XX] Breaking News");
        assert_eq!(second.service, ServiceTier::Mock);
        assert!(second.cached);
        assert_eq!(second.confidence, 0.6);
        assert_eq!((p.calls(), s.calls()), (1, 1));
        assert_eq!(translator.metrics().memory_hits, 1);
    }

    #[tokio::test]
    async fn test_cached_substituted_mock_keeps_its_confidence() {
        let translator = HybridTranslator::builder().build();

        translator
            .translate_text("Breaking News", "en", "es", ContentType::News)
            .await;
        let second = translator
            .translate_text("Breaking News", "en", "es", ContentType::News)
            .await;

        assert_eq!(second.service, ServiceTier::Mock);
        assert_eq!(second.confidence, 0.7);
    }

    #[tokio::test]
    async fn test_rejected_batch_counts_one_failure_per_tier() {
        let (translator, p, s) = chain(Behavior::Empty, Behavior::Prefix("S"));
        let texts: Vec<String> = ["One", "Two", "Three"].iter().map(|t| t.to_string()).collect();

        let results = translator
            .translate_many(&texts, &"en".into(), &"fr".into(), ContentType::News)
            .await;

        assert!(results.iter().all(|r| r.service == ServiceTier::SecondaryProvider));
        assert_eq!((p.batch_calls(), s.batch_calls()), (1, 1));

        let report = translator.metrics();
        assert_eq!(report.provider_calls, 2);
        assert_eq!(report.provider_failures, 1);
        assert_eq!(report.provider_success_rate, 50.0);
    }
}
