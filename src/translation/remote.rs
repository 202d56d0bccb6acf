use crate::i18n::LanguageCode;
use crate::translation::ContentType;
use anyhow::Result;
use futures::future::BoxFuture;

/// Source text is stored (and matched) truncated to this many chars
pub const SOURCE_TEXT_MAX_CHARS: usize = 1000;

/// Stored translations are truncated to this many chars
pub const TRANSLATED_TEXT_MAX_CHARS: usize = 2000;

/// A row of the shared translation cache table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCacheRow {
    pub source_text: String,
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
    pub translation_type: ContentType,
    pub translated_text: String,
}

impl RemoteCacheRow {
    /// Build a row, applying the column truncation limits.
    pub fn new(
        source_text: &str,
        source_language: &LanguageCode,
        target_language: &LanguageCode,
        translation_type: ContentType,
        translated_text: &str,
    ) -> Self {
        Self {
            source_text: truncate_chars(source_text, SOURCE_TEXT_MAX_CHARS),
            source_language: source_language.clone(),
            target_language: target_language.clone(),
            translation_type,
            translated_text: truncate_chars(translated_text, TRANSLATED_TEXT_MAX_CHARS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    Inserted,
    /// A row for the same key already existed; it was left untouched
    AlreadyPresent,
}

/// Persistent translation cache shared by every session.
///
/// Append-only: rows are read, or written if absent, never updated or deleted.
pub trait RemoteCache: Send + Sync {
    fn lookup<'a>(
        &'a self,
        source_text: &'a str,
        from: &'a LanguageCode,
        to: &'a LanguageCode,
        content_type: ContentType,
    ) -> BoxFuture<'a, Result<Option<String>>>;

    fn store(&self, row: RemoteCacheRow) -> BoxFuture<'_, Result<StoreOutcome>>;
}

/// Truncate on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
