//! Google Cloud Translation (v2 REST) provider.

use crate::i18n::LanguageCode;
use crate::retry::{is_retryable_status_error, with_retry_if, RetryConfig};
use crate::translation::TranslationProvider;
use anyhow::{bail, Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GoogleRequest<'a> {
    q: &'a [String],
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    data: GoogleData,
}

#[derive(Debug, Deserialize)]
struct GoogleData {
    translations: Vec<GoogleTranslation>,
}

#[derive(Debug, Deserialize)]
struct GoogleTranslation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            retry: RetryConfig::provider_call(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// One request for all texts; Google accepts repeated `q` values.
    async fn request(
        &self,
        texts: &[String],
        from: &LanguageCode,
        to: &LanguageCode,
    ) -> Result<Vec<String>> {
        let body = GoogleRequest {
            q: texts,
            source: from.as_str(),
            target: to.as_str(),
            format: "text",
        };

        let translations = with_retry_if(
            &self.retry,
            &format!("Google translation {}->{}", from, to),
            || async {
                let response = self
                    .client
                    .post(&self.api_url)
                    .query(&[("key", self.api_key.as_str())])
                    .json(&body)
                    .send()
                    .await
                    .context("Failed to send request to Google Translate API")?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                    bail!("Google Translate API error ({}): {}", status, body);
                }

                let parsed: GoogleResponse = response
                    .json()
                    .await
                    .context("Failed to parse Google Translate response")?;

                Ok(parsed.data.translations)
            },
            is_retryable_status_error,
        )
        .await?;

        if translations.len() != texts.len() {
            bail!(
                "Google Translate returned {} translations for {} texts",
                translations.len(),
                texts.len()
            );
        }

        Ok(translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }
}

impl TranslationProvider for GoogleTranslator {
    fn name(&self) -> &'static str {
        "google"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        from: &'a LanguageCode,
        to: &'a LanguageCode,
    ) -> BoxFuture<'a, Result<String>> {
        async move {
            let texts = [text.to_string()];
            let mut translated = self.request(&texts, from, to).await?;
            translated
                .pop()
                .context("Google Translate response contained no translations")
        }
        .boxed()
    }

    fn translate_batch<'a>(
        &'a self,
        texts: &'a [String],
        from: &'a LanguageCode,
        to: &'a LanguageCode,
    ) -> BoxFuture<'a, Result<Vec<String>>> {
        async move {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            self.request(texts, from, to).await
        }
        .boxed()
    }
}
