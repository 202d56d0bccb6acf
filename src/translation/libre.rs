//! LibreTranslate provider. Usually the secondary tier.

use crate::i18n::LanguageCode;
use crate::retry::{is_retryable_status_error, with_retry_if, RetryConfig};
use crate::translation::TranslationProvider;
use anyhow::{bail, Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct LibreResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Clone)]
pub struct LibreTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl LibreTranslator {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: Option<&str>) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.map(str::to_string),
            retry: RetryConfig::provider_call(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl TranslationProvider for LibreTranslator {
    fn name(&self) -> &'static str {
        "libretranslate"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        from: &'a LanguageCode,
        to: &'a LanguageCode,
    ) -> BoxFuture<'a, Result<String>> {
        async move {
            let body = LibreRequest {
                q: text,
                source: from.as_str(),
                target: to.as_str(),
                format: "text",
                api_key: self.api_key.as_deref(),
            };

            let translated = with_retry_if(
                &self.retry,
                &format!("LibreTranslate {}->{}", from, to),
                || async {
                    let response = self
                        .client
                        .post(&self.api_url)
                        .json(&body)
                        .send()
                        .await
                        .context("Failed to send request to LibreTranslate")?;

                    if !response.status().is_success() {
                        let status = response.status();
                        let body = response
                            .text()
                            .await
                            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                        bail!("LibreTranslate API error ({}): {}", status, body);
                    }

                    let parsed: LibreResponse = response
                        .json()
                        .await
                        .context("Failed to parse LibreTranslate response")?;

                    Ok(parsed.translated_text)
                },
                is_retryable_status_error,
            )
            .await?;

            if translated.trim().is_empty() {
                bail!("LibreTranslate returned an empty translation");
            }

            Ok(translated)
        }
        .boxed()
    }
}
