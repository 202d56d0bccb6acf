use crate::i18n::LanguageCode;
use anyhow::Result;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

/// A third-party translation API.
///
/// Every tier of the fallback chain is one of these behind the same
/// `(text, from, to) -> Result<String>` shape, so tiers can be added,
/// removed or reordered without touching the orchestrator.
pub trait TranslationProvider: Send + Sync {
    /// Short name for logs and metrics, e.g. `"google"`
    fn name(&self) -> &'static str;

    fn translate<'a>(
        &'a self,
        text: &'a str,
        from: &'a LanguageCode,
        to: &'a LanguageCode,
    ) -> BoxFuture<'a, Result<String>>;

    /// Translate several texts; output order matches input order.
    ///
    /// The default issues the single-text calls concurrently and fails if any
    /// of them fails. Providers with a native batch endpoint override this.
    fn translate_batch<'a>(
        &'a self,
        texts: &'a [String],
        from: &'a LanguageCode,
        to: &'a LanguageCode,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        async move {
            join_all(texts.iter().map(|text| self.translate(text, from, to)))
                .await
                .into_iter()
                .collect()
        }
        .boxed()
    }
}
