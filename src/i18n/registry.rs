//! Language registry: the fixed set of languages the frontend offers.
//!
//! The table is immutable and built once behind a `OnceLock`. The translation
//! tiers accept codes outside this set (they degrade to the mock tier), but
//! language pickers and prompts only ever see registry entries.

use serde::Serialize;
use std::sync::OnceLock;

/// Metadata for a supported language.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "es")
    pub code: &'static str,

    /// English name of the language (e.g., "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "Español")
    pub native_name: &'static str,

    /// Source language of all authored UI strings and articles; exactly one
    pub is_canonical: bool,

    /// Whether the language is offered to users
    pub enabled: bool,
}

pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the registry, building it on first access.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Look up a language by its (case-sensitive, normalized) code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// The canonical language configuration.
    ///
    /// # Panics
    /// Panics if the compiled-in table does not contain exactly one canonical
    /// language.
    pub fn canonical(&self) -> &LanguageConfig {
        let mut canonical = self.languages.iter().filter(|lang| lang.is_canonical);
        match (canonical.next(), canonical.next()) {
            (Some(lang), None) => lang,
            (None, _) => panic!("No canonical language found in registry"),
            (Some(_), Some(_)) => panic!("Multiple canonical languages found in registry"),
        }
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    const TABLE: &[(&str, &str, &str)] = &[
        ("en", "English", "English"),
        ("es", "Spanish", "Español"),
        ("fr", "French", "Français"),
        ("de", "German", "Deutsch"),
        ("pt", "Portuguese", "Português"),
        ("it", "Italian", "Italiano"),
        ("zh", "Chinese", "中文"),
        ("ja", "Japanese", "日本語"),
        ("ko", "Korean", "한국어"),
        ("ar", "Arabic", "العربية"),
        ("hi", "Hindi", "हिन्दी"),
        ("ru", "Russian", "Русский"),
    ];

    TABLE
        .iter()
        .map(|&(code, name, native_name)| LanguageConfig {
            code,
            name,
            native_name,
            is_canonical: code == "en",
            enabled: true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        assert!(std::ptr::eq(LanguageRegistry::get(), LanguageRegistry::get()));
    }

    #[test]
    fn test_get_by_code_spanish() {
        let config = LanguageRegistry::get().get_by_code("es").unwrap();
        assert_eq!(config.name, "Spanish");
        assert_eq!(config.native_name, "Español");
        assert!(!config.is_canonical);
        assert!(config.enabled);
    }

    #[test]
    fn test_get_by_code_unknown() {
        assert!(LanguageRegistry::get().get_by_code("xx").is_none());
        assert!(LanguageRegistry::get().get_by_code("ES").is_none());
    }

    #[test]
    fn test_canonical_is_english() {
        let canonical = LanguageRegistry::get().canonical();
        assert_eq!(canonical.code, "en");
    }

    #[test]
    fn test_list_enabled_has_twelve_languages() {
        let enabled = LanguageRegistry::get().list_enabled();
        assert_eq!(enabled.len(), 12);
        assert_eq!(enabled.len(), LanguageRegistry::get().list_all().len());
        assert!(enabled.iter().any(|lang| lang.code == "ja"));
    }

    #[test]
    fn test_codes_are_unique() {
        let all = LanguageRegistry::get().list_all();
        let mut codes: Vec<_> = all.iter().map(|lang| lang.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_is_enabled() {
        let registry = LanguageRegistry::get();
        assert!(registry.is_enabled("fr"));
        assert!(!registry.is_enabled("xx"));
    }
}
