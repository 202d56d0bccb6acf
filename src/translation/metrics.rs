//! Translation counters.
//!
//! Owned by a `HybridTranslator` rather than a process global, so each
//! service instance (and each test) sees its own numbers.

use crate::translation::ServiceTier;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct TranslationMetrics {
    started_at: DateTime<Utc>,
    passthrough: AtomicUsize,
    prebuilt_hits: AtomicUsize,
    memory_hits: AtomicUsize,
    remote_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    primary_served: AtomicUsize,
    secondary_served: AtomicUsize,
    mock_served: AtomicUsize,
    provider_calls: AtomicUsize,
    provider_failures: AtomicUsize,
    remote_failures: AtomicUsize,
}

impl Default for TranslationMetrics {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            passthrough: AtomicUsize::new(0),
            prebuilt_hits: AtomicUsize::new(0),
            memory_hits: AtomicUsize::new(0),
            remote_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            primary_served: AtomicUsize::new(0),
            secondary_served: AtomicUsize::new(0),
            mock_served: AtomicUsize::new(0),
            provider_calls: AtomicUsize::new(0),
            provider_failures: AtomicUsize::new(0),
            remote_failures: AtomicUsize::new(0),
        }
    }
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_hit(&self) {
        self.remote_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Both cache tiers missed
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_failure(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a result by the tier that served it. Cache hits are counted
    /// separately through `record_memory_hit` / `record_remote_hit`.
    pub fn record_served(&self, tier: ServiceTier) {
        let counter = match tier {
            ServiceTier::None => &self.passthrough,
            ServiceTier::Prebuilt => &self.prebuilt_hits,
            ServiceTier::PrimaryProvider => &self.primary_served,
            ServiceTier::SecondaryProvider => &self.secondary_served,
            ServiceTier::Mock => &self.mock_served,
            ServiceTier::Cache => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> MetricsReport {
        let load = |counter: &AtomicUsize| counter.load(Ordering::Relaxed);

        let memory_hits = load(&self.memory_hits);
        let remote_hits = load(&self.remote_hits);
        let cache_misses = load(&self.cache_misses);
        let cache_queries = memory_hits + remote_hits + cache_misses;
        let cache_hit_rate = if cache_queries > 0 {
            ((memory_hits + remote_hits) as f64 / cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let provider_calls = load(&self.provider_calls);
        let provider_failures = load(&self.provider_failures);
        let provider_success_rate = if provider_calls > 0 {
            (provider_calls.saturating_sub(provider_failures) as f64 / provider_calls as f64)
                * 100.0
        } else {
            0.0
        };

        MetricsReport {
            since: self.started_at,
            passthrough: load(&self.passthrough),
            prebuilt_hits: load(&self.prebuilt_hits),
            memory_hits,
            remote_hits,
            cache_misses,
            cache_hit_rate,
            primary_served: load(&self.primary_served),
            secondary_served: load(&self.secondary_served),
            mock_served: load(&self.mock_served),
            provider_calls,
            provider_failures,
            provider_success_rate,
            remote_failures: load(&self.remote_failures),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Counters cover the period from this instant until the report
    pub since: DateTime<Utc>,
    pub passthrough: usize,
    pub prebuilt_hits: usize,
    pub memory_hits: usize,
    pub remote_hits: usize,
    pub cache_misses: usize,
    /// Percentage (0-100) of cache lookups answered by either cache tier
    pub cache_hit_rate: f64,
    pub primary_served: usize,
    pub secondary_served: usize,
    pub mock_served: usize,
    pub provider_calls: usize,
    pub provider_failures: usize,
    /// Percentage (0-100)
    pub provider_success_rate: f64,
    pub remote_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_empty() {
        let report = TranslationMetrics::new().report();
        assert_eq!(report.cache_hit_rate, 0.0);
        assert_eq!(report.provider_success_rate, 0.0);
        assert_eq!(report.provider_calls, 0);
    }

    #[test]
    fn test_cache_hit_rate_counts_both_tiers() {
        let metrics = TranslationMetrics::new();
        metrics.record_memory_hit();
        metrics.record_memory_hit();
        metrics.record_remote_hit();
        metrics.record_cache_miss();

        let report = metrics.report();
        assert_eq!(report.memory_hits, 2);
        assert_eq!(report.remote_hits, 1);
        assert_eq!(report.cache_hit_rate, 75.0);
    }

    #[test]
    fn test_provider_success_rate() {
        let metrics = TranslationMetrics::new();
        for _ in 0..4 {
            metrics.record_provider_call();
        }
        metrics.record_provider_failure();

        assert_eq!(metrics.report().provider_success_rate, 75.0);
        assert_eq!(metrics.provider_calls(), 4);
    }

    #[test]
    fn test_record_served_by_tier() {
        let metrics = TranslationMetrics::new();
        metrics.record_served(ServiceTier::PrimaryProvider);
        metrics.record_served(ServiceTier::Mock);
        metrics.record_served(ServiceTier::Mock);
        metrics.record_served(ServiceTier::Cache);
        metrics.record_served(ServiceTier::None);

        let report = metrics.report();
        assert_eq!(report.primary_served, 1);
        assert_eq!(report.mock_served, 2);
        assert_eq!(report.passthrough, 1);
        assert_eq!(report.memory_hits, 0);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = TranslationMetrics::new();
        let b = TranslationMetrics::new();
        a.record_provider_call();
        assert_eq!(a.provider_calls(), 1);
        assert_eq!(b.provider_calls(), 0);
    }

    #[test]
    fn test_report_serializes() {
        let json = serde_json::to_value(TranslationMetrics::new().report()).unwrap();
        assert!(json.get("cache_hit_rate").is_some());
        assert!(json.get("mock_served").is_some());
        assert!(json["since"].is_string());
    }
}
