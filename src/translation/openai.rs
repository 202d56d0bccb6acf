//! OpenAI chat-completions provider.
//!
//! Useful as a primary tier for long article summaries, where an LLM keeps
//! tone and structure better than phrase-based engines.

use crate::i18n::LanguageCode;
use crate::retry::{is_retryable_status_error, with_retry_if, RetryConfig};
use crate::translation::TranslationProvider;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Reasoning models reject `temperature` and need a larger token budget
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

fn build_system_prompt(from: &str, to: &str) -> String {
    format!(
        r#"You are a professional news translator. Translate the user's text from {} to {}.

Rules:
- Reply with the translation only, no preamble or notes
- Keep names of people, organisations, outlets and products unchanged
- Keep URLs, @mentions, #hashtags, numbers and dates exactly as written
- Preserve markdown, line breaks and emojis
- Keep the neutral, factual register of news copy; do not add or soften claims
- If a term has no good translation, keep the original term"#,
        from, to
    )
}

#[derive(Clone)]
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    retry: RetryConfig,
}

impl OpenAiTranslator {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            retry: RetryConfig::provider_call(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn build_request(&self, text: &str, from: &LanguageCode, to: &LanguageCode) -> ChatRequest {
        let is_reasoning = is_reasoning_model(&self.model);

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_system_prompt(&from.display_name(), &to.display_name()),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            max_completion_tokens: if is_reasoning { 16000 } else { 4000 },
            temperature: if is_reasoning { None } else { Some(0.2) },
            reasoning_effort: is_reasoning.then(|| "low".to_string()),
        }
    }
}

impl TranslationProvider for OpenAiTranslator {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        from: &'a LanguageCode,
        to: &'a LanguageCode,
    ) -> BoxFuture<'a, Result<String>> {
        async move {
            let request = self.build_request(text, from, to);

            with_retry_if(
                &self.retry,
                &format!("OpenAI translation {}->{}", from, to),
                || async {
                    let response = self
                        .client
                        .post(&self.api_url)
                        .header("Authorization", format!("Bearer {}", self.api_key))
                        .json(&request)
                        .send()
                        .await
                        .context("Failed to send translation request to OpenAI API")?;

                    if !response.status().is_success() {
                        let status = response.status();
                        let body = response
                            .text()
                            .await
                            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                        anyhow::bail!("OpenAI API error ({}): {}", status, body);
                    }

                    let chat: ChatResponse = response
                        .json()
                        .await
                        .context("Failed to parse OpenAI translation response")?;

                    let content = chat
                        .choices
                        .into_iter()
                        .next()
                        .map(|c| c.message.content.trim().to_string())
                        .filter(|c| !c.is_empty())
                        .context("OpenAI translation response contained no content")?;

                    Ok(content)
                },
                is_retryable_status_error,
            )
            .await
        }
        .boxed()
    }
}
