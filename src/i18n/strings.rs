//! Prebuilt UI translations.
//!
//! Hand-authored translations for short interface labels, compiled in and
//! never mutated. Consulted before any cache or provider so common labels
//! render without a network round-trip.

use std::collections::HashMap;

/// (ui key, [(language code, text)]); the `en` column is the source text.
const BUILTIN: &[(&str, &[(&str, &str)])] = &[
    (
        "nav.home",
        &[("en", "Home"), ("es", "Inicio"), ("fr", "Accueil"), ("de", "Startseite"), ("pt", "Início")],
    ),
    (
        "nav.news",
        &[("en", "News"), ("es", "Noticias"), ("fr", "Actualités"), ("de", "Nachrichten"), ("pt", "Notícias")],
    ),
    (
        "nav.submit",
        &[("en", "Submit News"), ("es", "Enviar Noticia"), ("fr", "Soumettre une actualité"), ("de", "Nachricht einreichen"), ("pt", "Enviar Notícia")],
    ),
    (
        "nav.validator",
        &[("en", "AI Validator"), ("es", "Validador IA"), ("fr", "Validateur IA"), ("de", "KI-Prüfer"), ("pt", "Validador IA")],
    ),
    (
        "nav.admin",
        &[("en", "Admin"), ("es", "Administración"), ("fr", "Administration"), ("de", "Verwaltung"), ("pt", "Administração")],
    ),
    (
        "auth.sign_in",
        &[("en", "Sign In"), ("es", "Iniciar Sesión"), ("fr", "Se connecter"), ("de", "Anmelden"), ("pt", "Entrar")],
    ),
    (
        "auth.sign_up",
        &[("en", "Sign Up"), ("es", "Registrarse"), ("fr", "S'inscrire"), ("de", "Registrieren"), ("pt", "Cadastrar-se")],
    ),
    (
        "auth.sign_out",
        &[("en", "Sign Out"), ("es", "Cerrar Sesión"), ("fr", "Se déconnecter"), ("de", "Abmelden"), ("pt", "Sair")],
    ),
    (
        "vote.credible",
        &[("en", "Credible"), ("es", "Creíble"), ("fr", "Crédible"), ("de", "Glaubwürdig"), ("pt", "Confiável")],
    ),
    (
        "vote.not_credible",
        &[("en", "Not Credible"), ("es", "No Creíble"), ("fr", "Pas crédible"), ("de", "Nicht glaubwürdig"), ("pt", "Não Confiável")],
    ),
    (
        "article.read_more",
        &[("en", "Read More"), ("es", "Leer Más"), ("fr", "Lire la suite"), ("de", "Weiterlesen"), ("pt", "Leia Mais")],
    ),
    (
        "article.source",
        &[("en", "Source"), ("es", "Fuente"), ("fr", "Source"), ("de", "Quelle"), ("pt", "Fonte")],
    ),
    (
        "article.comments",
        &[("en", "Comments"), ("es", "Comentarios"), ("fr", "Commentaires"), ("de", "Kommentare"), ("pt", "Comentários")],
    ),
    (
        "chat.placeholder",
        &[("en", "Ask the validator about this story"), ("es", "Pregunta al validador sobre esta noticia"), ("fr", "Interrogez le validateur sur cet article"), ("de", "Frage den Prüfer zu dieser Meldung"), ("pt", "Pergunte ao validador sobre esta notícia")],
    ),
    (
        "chat.send",
        &[("en", "Send"), ("es", "Enviar"), ("fr", "Envoyer"), ("de", "Senden"), ("pt", "Enviar")],
    ),
    (
        "common.search",
        &[("en", "Search"), ("es", "Buscar"), ("fr", "Rechercher"), ("de", "Suchen"), ("pt", "Pesquisar")],
    ),
    (
        "common.loading",
        &[("en", "Loading..."), ("es", "Cargando..."), ("fr", "Chargement..."), ("de", "Wird geladen..."), ("pt", "Carregando...")],
    ),
    (
        "common.language",
        &[("en", "Language"), ("es", "Idioma"), ("fr", "Langue"), ("de", "Sprache"), ("pt", "Idioma")],
    ),
];

/// Static `ui key → {language → text}` table with a reverse index on the
/// source text of every language column.
#[derive(Debug, Clone, Default)]
pub struct PrebuiltTranslations {
    entries: HashMap<String, HashMap<String, String>>,
    // (language, lowercased text) -> ui key
    by_text: HashMap<(String, String), String>,
}

impl PrebuiltTranslations {
    /// The compiled-in table.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN.iter().map(|(key, columns)| {
            (
                key.to_string(),
                columns
                    .iter()
                    .map(|(lang, text)| (lang.to_string(), text.to_string())),
            )
        }))
    }

    pub fn from_entries<I, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, C)>,
        C: IntoIterator<Item = (String, String)>,
    {
        let mut table = Self::default();
        for (key, columns) in entries {
            let columns: HashMap<String, String> = columns.into_iter().collect();
            for (lang, text) in &columns {
                table
                    .by_text
                    .insert((lang.clone(), normalize(text)), key.clone());
            }
            table.entries.insert(key, columns);
        }
        table
    }

    /// Translation of `key` into `lang`, if authored.
    pub fn lookup(&self, key: &str, lang: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|columns| columns.get(lang))
            .map(String::as_str)
    }

    /// Translation of a known label given its text in `from`.
    ///
    /// Matching ignores surrounding whitespace and letter case.
    pub fn lookup_text(&self, text: &str, from: &str, to: &str) -> Option<&str> {
        let key = self.by_text.get(&(from.to_string(), normalize(text)))?;
        self.lookup(key, to)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
