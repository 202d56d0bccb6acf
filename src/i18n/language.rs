//! Language handles.
//!
//! `Language` is a registry-validated language used wherever the frontend
//! offers a choice. `LanguageCode` is the looser, normalized code the
//! translation tiers work with, since a request for a language outside the
//! registry must still resolve (down to the mock tier).

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated, enabled registry language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const SPANISH: Language = Language { code: "es" };

    /// Create a Language from a code such as `"es"` or `"pt-BR"`.
    pub fn from_code(code: &str) -> Result<Language> {
        let normalized = LanguageCode::new(code);
        match LanguageRegistry::get().get_by_code(normalized.as_str()) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The language UI strings are authored in.
    pub fn canonical() -> Language {
        Language {
            code: LanguageRegistry::get().canonical().code,
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// # Panics
    /// Never for values built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }
}

impl From<Language> for LanguageCode {
    fn from(language: Language) -> Self {
        LanguageCode(language.code.to_string())
    }
}

/// A normalized language code: trimmed, lower-cased, region subtag dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: &str) -> Self {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        LanguageCode(primary)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Registry entry for this code, if it is a supported language.
    pub fn language(&self) -> Option<Language> {
        Language::from_code(&self.0).ok()
    }

    /// English name for prompts and logs, falling back to the bare code.
    pub fn display_name(&self) -> String {
        match self.language() {
            Some(language) => language.name().to_string(),
            None => self.0.clone(),
        }
    }

    /// Upper-cased tag used for untranslated passthrough text, e.g. `XX`.
    pub fn tag(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LanguageCode {
    fn from(code: String) -> Self {
        LanguageCode::new(&code)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        LanguageCode::new(code)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}
