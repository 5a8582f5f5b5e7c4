use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{error_from_response, has_key, http_client, CompletionProvider};
use crate::errors::ProviderError;

const API_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct Anthropic {
    model: String,
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Msg<'a>>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

impl Anthropic {
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

#[async_trait]
impl CompletionProvider for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn has_credential(&self) -> bool {
        has_key(&self.api_key)
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let body = MsgRequest {
            model: &self.model,
            max_tokens: 8192,
            messages: vec![Msg { role: "user", content: prompt }],
        };

        tracing::debug!(model = %self.model, %url, "POST anthropic messages");
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &text));
        }

        let parsed: MsgResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::new(format!("anthropic response parse error: {e}")))?;

        Ok(parsed
            .content
            .into_iter()
            .filter(|b| b.r#type == "text")
            .map(|b| b.text)
            .collect())
    }
}
