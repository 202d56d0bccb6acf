use crate::i18n::LanguageCode;
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of text is being translated. Part of every cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Short interface labels
    Ui,
    /// Article titles and summaries
    #[default]
    News,
    /// Validator chat replies
    Chat,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Ui => "ui",
            ContentType::News => "news",
            ContentType::Chat => "chat",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ui" => Ok(ContentType::Ui),
            "news" => Ok(ContentType::News),
            "chat" => Ok(ContentType::Chat),
            other => bail!("Unknown content type: '{}'", other),
        }
    }
}

/// The tier that produced a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceTier {
    /// Source and target language are the same; text returned as-is
    None,
    Prebuilt,
    /// In-memory or remote cache
    Cache,
    PrimaryProvider,
    SecondaryProvider,
    Mock,
}

impl ServiceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTier::None => "none",
            ServiceTier::Prebuilt => "prebuilt",
            ServiceTier::Cache => "cache",
            ServiceTier::PrimaryProvider => "primary_provider",
            ServiceTier::SecondaryProvider => "secondary_provider",
            ServiceTier::Mock => "mock",
        }
    }

    /// Whether the tier involves a third-party provider
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            ServiceTier::PrimaryProvider | ServiceTier::SecondaryProvider
        )
    }
}

impl fmt::Display for ServiceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single translation request. Built per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub from: LanguageCode,
    pub to: LanguageCode,
    #[serde(default)]
    pub content_type: ContentType,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        from: impl Into<LanguageCode>,
        to: impl Into<LanguageCode>,
        content_type: ContentType,
    ) -> Self {
        Self {
            text: text.into(),
            from: from.into(),
            to: to.into(),
            content_type,
        }
    }

    /// Nothing to translate: same language on both sides, or blank text
    pub fn is_passthrough(&self) -> bool {
        self.from == self.to || self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translated_text: String,
    pub service: ServiceTier,
    /// True when the text came from a cache or the prebuilt table
    pub cached: bool,
    /// Fixed per-tier heuristic in [0, 1], not a model score
    pub confidence: f32,
}

impl TranslationResult {
    pub fn passthrough(text: impl Into<String>) -> Self {
        Self {
            translated_text: text.into(),
            service: ServiceTier::None,
            cached: false,
            confidence: 1.0,
        }
    }
}

/// Confidence reported for each tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierConfidence {
    pub prebuilt: f32,
    pub cache: f32,
    pub primary_provider: f32,
    pub secondary_provider: f32,
    /// Mock output where the substitution table matched something
    pub mock: f32,
    /// Mock output that is only the `[LANG]` tag plus the original text
    pub mock_passthrough: f32,
}

impl Default for TierConfidence {
    fn default() -> Self {
        Self {
            prebuilt: 1.0,
            cache: 0.9,
            primary_provider: 0.95,
            secondary_provider: 0.92,
            mock: 0.7,
            mock_passthrough: 0.6,
        }
    }
}

impl TierConfidence {
    pub fn for_tier(&self, tier: ServiceTier) -> f32 {
        match tier {
            ServiceTier::None => 1.0,
            ServiceTier::Prebuilt => self.prebuilt,
            ServiceTier::Cache => self.cache,
            ServiceTier::PrimaryProvider => self.primary_provider,
            ServiceTier::SecondaryProvider => self.secondary_provider,
            ServiceTier::Mock => self.mock,
        }
    }
}
