use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{error_from_response, has_key, http_client, CompletionProvider};
use crate::errors::ProviderError;

const API_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completions; the prompt goes out as a single user message.
pub struct OpenAIProvider {
    model: String,
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(
        model: String,
        api_key: Option<String>,
        api_base: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            model,
            api_key,
            api_base: api_base.unwrap_or_else(|| API_BASE_URL.to_string()),
            client: http_client(timeout)?,
        })
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn has_credential(&self) -> bool {
        has_key(&self.api_key)
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.7
        });

        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        tracing::debug!(model = %self.model, %url, "POST openai chat completion");
        let resp = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::new(format!("openai response parse error: {e}")))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}
