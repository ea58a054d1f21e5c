//! Auxiliary text-generation endpoint used for one-line genre summaries

use anyhow::{Result, bail};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::settle;
use crate::config::TextGenConfig;
use crate::log_api_request;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

#[derive(Serialize)]
struct RunRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunResult {
    response: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RunResponse {
    success: bool,
    result: Option<RunResult>,
}

/// Client for `POST {base}/accounts/{account}/ai/run/{model}`.
///
/// Without credentials the client is disabled and every call resolves to
/// `None` without touching the network.
#[derive(Clone, Debug)]
pub struct TextGenClient {
    http: Client,
    config: Option<TextGenConfig>,
}

impl TextGenClient {
    pub fn new(config: Option<TextGenConfig>) -> Self {
        Self { http: Client::new(), config }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Run `model` over `messages` and return the generated text.
    pub async fn run(&self, model: &str, messages: &[ChatMessage]) -> Option<String> {
        let Some(config) = &self.config else {
            tracing::debug!("Text generation disabled; no credentials configured");
            return None;
        };
        log_api_request!("textgen_run", model = %model);
        let result = self.try_run(config, model, messages).await.map(Some);
        settle("textgen_run", result)
    }

    async fn try_run(
        &self,
        config: &TextGenConfig,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String> {
        let url = format!(
            "{}/accounts/{}/ai/run/{}",
            config.base_url.trim_end_matches('/'),
            config.account_id,
            model
        );
        let response: RunResponse = self
            .http
            .post(url)
            .bearer_auth(&config.api_token)
            .json(&RunRequest { messages })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            bail!("text generation reported failure");
        }
        match response.result.and_then(|r| r.response) {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => bail!("text generation returned no text"),
        }
    }

    /// One-line summary of a music genre with the configured model.
    pub async fn summarize_genre(&self, genre: &str) -> Option<String> {
        let model = self.config.as_ref()?.model.clone();
        let messages = [
            ChatMessage::system("You are a friendly assistant"),
            ChatMessage::user(format!("Write a 1 line summary about {genre}")),
        ];
        self.run(&model, &messages).await
    }
}
