//! Internationalization: supported languages, prebuilt UI strings and
//! translation quality checks.
//!
//! - `registry`: the fixed set of languages offered to users
//! - `language`: `Language` (registry-validated) and `LanguageCode` (normalized, open)
//! - `strings`: hand-authored UI label translations
//! - `validator`: warn-only checks on provider output

mod language;
mod registry;
mod strings;
mod validator;

pub use language::{Language, LanguageCode};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use strings::PrebuiltTranslations;
pub use validator::{TranslationValidator, ValidationReport};
