//! Translation quality checks.
//!
//! Provider output is checked for elements that must survive translation
//! untouched in news copy: links, figures, and @mentions. Findings are only
//! logged; a suspicious translation is still better than none.

use regex::Regex;
use std::sync::OnceLock;

/// Inputs at least this many chars long should not come back unchanged.
const ECHO_MIN_CHARS: usize = 40;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// The translation is unusable (e.g. empty)
    pub errors: Vec<String>,

    /// The translation is usable but probably lost something
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

pub struct TranslationValidator;

static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static NUMBER_REGEX: OnceLock<Regex> = OnceLock::new();
static MENTION_REGEX: OnceLock<Regex> = OnceLock::new();

impl TranslationValidator {
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::default();

        if translated.trim().is_empty() {
            if !original.trim().is_empty() {
                report.errors.push("Translation is empty".to_string());
            }
            return report;
        }

        if original.chars().count() >= ECHO_MIN_CHARS && original.trim() == translated.trim() {
            report
                .warnings
                .push("Translation is identical to the original text".to_string());
        }

        let orig_urls = Self::extract(&URL_REGEX, r#"https?://[^\s)>\]"']+"#, original);
        let trans_urls = Self::extract(&URL_REGEX, r#"https?://[^\s)>\]"']+"#, translated);
        if orig_urls != trans_urls {
            report.warnings.push(format!(
                "URL mismatch: original has {} URLs, translation has {}",
                orig_urls.len(),
                trans_urls.len()
            ));
        }

        // Figures may change separators between locales (1,000 vs 1.000), so
        // only the digits are compared.
        let orig_numbers = Self::digits(original);
        let trans_numbers = Self::digits(translated);
        if orig_numbers != trans_numbers {
            report.warnings.push(format!(
                "Number mismatch: original has {:?}, translation has {:?}",
                orig_numbers, trans_numbers
            ));
        }

        let orig_mentions = Self::extract(&MENTION_REGEX, r"@[A-Za-z0-9_]+", original);
        let trans_mentions = Self::extract(&MENTION_REGEX, r"@[A-Za-z0-9_]+", translated);
        if orig_mentions != trans_mentions {
            report.warnings.push(format!(
                "Mention mismatch: original has {:?}, translation has {:?}",
                orig_mentions, trans_mentions
            ));
        }

        report
    }

    fn extract(cell: &'static OnceLock<Regex>, pattern: &str, text: &str) -> Vec<String> {
        let regex = cell.get_or_init(|| Regex::new(pattern).expect("static pattern is valid"));
        let mut found: Vec<String> = regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect();
        found.sort();
        found
    }

    fn digits(text: &str) -> Vec<String> {
        let mut digits: Vec<String> = Self::extract(&NUMBER_REGEX, r"\d[\d.,]*", text)
            .into_iter()
            .map(|n| n.chars().filter(char::is_ascii_digit).collect())
            .collect();
        digits.sort();
        digits
    }
}
