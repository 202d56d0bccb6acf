//! UI label resolution.
//!
//! Labels are addressed by a stable key (`nav.home`) and carry their English
//! text as a fallback. Authored translations answer synchronously; anything
//! else goes through the orchestrator as `ui` content, batched so a page
//! load costs one provider request rather than one per label.

use crate::i18n::{Language, LanguageCode};
use crate::translation::{ContentType, HybridTranslator, TranslationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiLabel {
    pub key: String,
    /// English text, used when no authored translation exists
    pub text: String,
}

impl UiLabel {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiTranslation {
    pub key: String,
    pub result: TranslationResult,
}

/// Collapse batch output to `key → text`.
pub fn into_map(translations: Vec<UiTranslation>) -> HashMap<String, String> {
    translations
        .into_iter()
        .map(|t| (t.key, t.result.translated_text))
        .collect()
}

pub struct UiTranslator {
    translator: Arc<HybridTranslator>,
    in_flight: AtomicUsize,
}

impl UiTranslator {
    pub fn new(translator: Arc<HybridTranslator>) -> Self {
        Self {
            translator,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn translator(&self) -> &HybridTranslator {
        &self.translator
    }

    /// True only while a batched provider call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Authored translation for `key`, without any I/O.
    pub fn lookup(&self, key: &str, to: &LanguageCode) -> Option<TranslationResult> {
        self.translator
            .prebuilt()
            .lookup(key, to.as_str())
            .map(|text| self.translator.prebuilt_result(text))
    }

    /// Resolve one label: registry first, else translate `fallback` from
    /// English through the full chain.
    pub async fn translate_ui(&self, key: &str, fallback: &str, to: &str) -> TranslationResult {
        let to = LanguageCode::new(to);
        if let Some(result) = self.lookup(key, &to) {
            return result;
        }

        self.translator
            .translate_text(fallback, Language::canonical().code(), to.as_str(), ContentType::Ui)
            .await
    }

    /// Resolve many labels. Output order matches `labels`.
    pub async fn translate_ui_batch(&self, labels: &[UiLabel], to: &str) -> Vec<UiTranslation> {
        let to = LanguageCode::new(to);
        let from: LanguageCode = Language::canonical().into();

        let mut results: Vec<Option<TranslationResult>> = labels
            .iter()
            .map(|label| self.lookup(&label.key, &to))
            .collect();

        let pending: Vec<usize> = (0..labels.len()).filter(|&i| results[i].is_none()).collect();
        if !pending.is_empty() {
            let texts: Vec<String> = pending.iter().map(|&i| labels[i].text.clone()).collect();

            let translated = self
                .translator
                .translate_many_tracked(&texts, &from, &to, ContentType::Ui, Some(&self.in_flight))
                .await;

            for (i, result) in pending.into_iter().zip(translated) {
                results[i] = Some(result);
            }
        }

        labels
            .iter()
            .zip(results)
            .map(|(label, result)| UiTranslation {
                key: label.key.clone(),
                result: result.unwrap_or_else(|| TranslationResult::passthrough(label.text.clone())),
            })
            .collect()
    }
}
