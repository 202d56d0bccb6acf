//! Session-wide in-memory translation cache.
//!
//! Bounded LRU keyed by (content type, source, target, first 100 chars of the
//! text). A hash of the full text is folded into the key so two long articles
//! that share an opening sentence never read each other's translation.
//! Entries are only ever evicted by capacity, never invalidated. Each entry
//! remembers the tier that produced it, so mock output read back from the
//! cache is still reported as mock output.

use crate::i18n::LanguageCode;
use crate::translation::{ContentType, ServiceTier};
use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Number of leading characters of the source text kept in the key
pub const KEY_PREFIX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    content_type: ContentType,
    from: LanguageCode,
    to: LanguageCode,
    prefix: String,
    text_hash: u64,
}

impl CacheKey {
    pub fn new(text: &str, from: &LanguageCode, to: &LanguageCode, content_type: ContentType) -> Self {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);

        Self {
            content_type,
            from: from.clone(),
            to: to.clone(),
            prefix: text.chars().take(KEY_PREFIX_CHARS).collect(),
            text_hash: hasher.finish(),
        }
    }
}

/// A cached translation and the tier it originally came from
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTranslation {
    pub text: String,
    pub origin: ServiceTier,
    pub confidence: f32,
}

impl CachedTranslation {
    pub fn new(text: impl Into<String>, origin: ServiceTier, confidence: f32) -> Self {
        Self {
            text: text.into(),
            origin,
            confidence,
        }
    }
}

pub struct MemoryCache {
    inner: Mutex<LruCache<CacheKey, CachedTranslation>>,
}

impl MemoryCache {
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    // Writes are idempotent (same key, same value), so a poisoned lock still
    // holds a consistent map.
    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, CachedTranslation>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedTranslation> {
        self.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().contains(key)
    }

    pub fn insert(&self, key: CacheKey, translated: CachedTranslation) {
        self.lock().put(key, translated);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
