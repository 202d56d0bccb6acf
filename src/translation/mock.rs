//! Last-resort local translation.
//!
//! A deterministic keyword/phrase substitution per target language. When no
//! table exists for the target, or nothing in the text matches, the original
//! text is returned tagged as `[LANG] text` so readers can tell it is
//! untranslated. Never fails and never touches the network.

use crate::i18n::LanguageCode;
use regex::{Captures, Regex};
use std::collections::HashMap;
use tracing::warn;

const SPANISH: &[(&str, &str)] = &[
    ("breaking news", "última hora"),
    ("fact check", "verificación de datos"),
    ("fake news", "noticias falsas"),
    ("according to", "según"),
    ("government", "gobierno"),
    ("president", "presidente"),
    ("election", "elección"),
    ("report", "informe"),
    ("news", "noticias"),
    ("today", "hoy"),
    ("world", "mundo"),
    ("health", "salud"),
    ("economy", "economía"),
    ("police", "policía"),
    ("true", "verdadero"),
    ("false", "falso"),
    ("and", "y"),
    ("the", "el"),
];

const FRENCH: &[(&str, &str)] = &[
    ("breaking news", "dernière minute"),
    ("fact check", "vérification des faits"),
    ("fake news", "fausses nouvelles"),
    ("according to", "selon"),
    ("government", "gouvernement"),
    ("president", "président"),
    ("election", "élection"),
    ("report", "rapport"),
    ("news", "actualités"),
    ("today", "aujourd'hui"),
    ("world", "monde"),
    ("health", "santé"),
    ("economy", "économie"),
    ("police", "police"),
    ("true", "vrai"),
    ("false", "faux"),
    ("and", "et"),
];

const GERMAN: &[(&str, &str)] = &[
    ("breaking news", "Eilmeldung"),
    ("fact check", "Faktencheck"),
    ("fake news", "Falschmeldungen"),
    ("according to", "laut"),
    ("government", "Regierung"),
    ("president", "Präsident"),
    ("election", "Wahl"),
    ("report", "Bericht"),
    ("news", "Nachrichten"),
    ("today", "heute"),
    ("world", "Welt"),
    ("health", "Gesundheit"),
    ("economy", "Wirtschaft"),
    ("police", "Polizei"),
    ("true", "wahr"),
    ("false", "falsch"),
    ("and", "und"),
];

const PORTUGUESE: &[(&str, &str)] = &[
    ("breaking news", "última hora"),
    ("fact check", "checagem de fatos"),
    ("fake news", "notícias falsas"),
    ("according to", "segundo"),
    ("government", "governo"),
    ("president", "presidente"),
    ("election", "eleição"),
    ("report", "relatório"),
    ("news", "notícias"),
    ("today", "hoje"),
    ("world", "mundo"),
    ("health", "saúde"),
    ("economy", "economia"),
    ("police", "polícia"),
    ("true", "verdadeiro"),
    ("false", "falso"),
    ("and", "e"),
];

const ITALIAN: &[(&str, &str)] = &[
    ("breaking news", "ultime notizie"),
    ("fact check", "verifica dei fatti"),
    ("according to", "secondo"),
    ("government", "governo"),
    ("president", "presidente"),
    ("election", "elezione"),
    ("report", "rapporto"),
    ("news", "notizie"),
    ("today", "oggi"),
    ("world", "mondo"),
    ("health", "salute"),
    ("economy", "economia"),
    ("police", "polizia"),
    ("true", "vero"),
    ("false", "falso"),
    ("and", "e"),
];

/// Output of the mock tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTranslation {
    pub text: String,
    /// False when the result is only the `[LANG]` tag plus the original
    pub substituted: bool,
}

struct SubstitutionTable {
    pattern: Regex,
    replacements: HashMap<String, String>,
}

impl SubstitutionTable {
    fn build(pairs: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let mut phrases: Vec<&str> = pairs.iter().map(|(from, _)| *from).collect();
        // Longest first so "breaking news" wins over "news"
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        let alternation = phrases
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{})\b", alternation))?;

        let replacements = pairs
            .iter()
            .map(|(from, to)| (from.to_lowercase(), to.to_string()))
            .collect();

        Ok(Self {
            pattern,
            replacements,
        })
    }

    fn apply(&self, text: &str) -> Option<String> {
        if !self.pattern.is_match(text) {
            return None;
        }

        let replaced = self.pattern.replace_all(text, |caps: &Captures| {
            let matched = &caps[0];
            let replacement = self
                .replacements
                .get(&matched.to_lowercase())
                .cloned()
                .unwrap_or_else(|| matched.to_string());
            match_case(matched, &replacement)
        });

        Some(replaced.into_owned())
    }
}

/// Carry the capitalisation of the matched source word over to the replacement
fn match_case(source: &str, replacement: &str) -> String {
    let mut source_chars = source.chars();
    let is_upper = source_chars.next().map(char::is_uppercase).unwrap_or(false);
    let all_upper = is_upper && source.len() > 1 && source.chars().all(|c| !c.is_lowercase());

    if all_upper {
        return replacement.to_uppercase();
    }
    if is_upper {
        let mut chars = replacement.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    replacement.to_string()
}

pub struct MockTranslator {
    tables: HashMap<String, SubstitutionTable>,
}

impl MockTranslator {
    /// The compiled-in tables (es, fr, de, pt, it).
    pub fn builtin() -> Self {
        Self::with_tables([
            ("es", SPANISH),
            ("fr", FRENCH),
            ("de", GERMAN),
            ("pt", PORTUGUESE),
            ("it", ITALIAN),
        ])
    }

    pub fn with_tables<'t>(tables: impl IntoIterator<Item = (&'t str, &'t [(&'t str, &'t str)])>) -> Self {
        let tables = tables
            .into_iter()
            .filter_map(|(lang, pairs)| match SubstitutionTable::build(pairs) {
                Ok(table) => Some((lang.to_string(), table)),
                Err(e) => {
                    warn!("Skipping mock table for {}: {}", lang, e);
                    None
                }
            })
            .collect();
        Self { tables }
    }

    pub fn translate(&self, text: &str, to: &LanguageCode) -> MockTranslation {
        let substituted = self
            .tables
            .get(to.as_str())
            .and_then(|table| table.apply(text));

        match substituted {
            Some(text) => MockTranslation {
                text,
                substituted: true,
            },
            None => MockTranslation {
                text: format!("[{}] {}", to.tag(), text),
                substituted: false,
            },
        }
    }
}

impl std::fmt::Debug for MockTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut languages: Vec<_> = self.tables.keys().collect();
        languages.sort();
        f.debug_struct("MockTranslator")
            .field("languages", &languages)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unknown_language_is_tagged_passthrough() {
        let mock = MockTranslator::builtin();
        let out = mock.translate("Breaking News", &"xx".into());
        assert_eq!(out.text, "[XX] Breaking News");
        assert!(!out.substituted);
    }

    #[test]
    fn test_phrase_substitution_prefers_longest_match() {
        let mock = MockTranslator::builtin();
        let out = mock.translate("Breaking News today", &"es".into());
        assert_eq!(out.text, "Última hora hoy");
        assert!(out.substituted);
    }

    #[test]
    fn test_substitution_respects_word_boundaries() {
        let mock = MockTranslator::builtin();
        // "newsroom" must not become "noticiasroom"
        let out = mock.translate("Inside the newsroom", &"es".into());
        assert_eq!(out.text, "Inside el newsroom");
    }

    #[test]
    fn test_all_caps_is_preserved() {
        let mock = MockTranslator::builtin();
        let out = mock.translate("FAKE NEWS", &"de".into());
        assert_eq!(out.text, "FALSCHMELDUNGEN");
    }

    #[test]
    fn test_table_without_match_is_tagged() {
        let mock = MockTranslator::builtin();
        let out = mock.translate("Quarterly earnings beat estimates", &"fr".into());
        assert_eq!(out.text, "[FR] Quarterly earnings beat estimates");
        assert!(!out.substituted);
    }

    #[test]
    fn test_match_case() {
        assert_eq!(match_case("News", "noticias"), "Noticias");
        assert_eq!(match_case("news", "noticias"), "noticias");
        assert_eq!(match_case("NEWS", "noticias"), "NOTICIAS");
        assert_eq!(match_case("A", "y"), "Y");
    }

    proptest! {
        #[test]
        fn prop_unknown_language_output_is_exact(text in ".{0,80}", lang in "[a-z]{2}") {
            prop_assume!(!["es", "fr", "de", "pt", "it"].contains(&lang.as_str()));
            let mock = MockTranslator::builtin();
            let code = LanguageCode::new(&lang);
            let out = mock.translate(&text, &code);
            prop_assert_eq!(out.text, format!("[{}] {}", lang.to_uppercase(), text));
        }

        #[test]
        fn prop_mock_is_deterministic(text in "[A-Za-z ]{0,60}") {
            let mock = MockTranslator::builtin();
            let code = LanguageCode::new("es");
            prop_assert_eq!(mock.translate(&text, &code), mock.translate(&text, &code));
        }
    }
}
