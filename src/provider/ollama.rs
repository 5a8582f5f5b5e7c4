use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{error_from_response, http_client, CompletionProvider};
use crate::errors::ProviderError;

/// Local Ollama server. Needs no credential.
pub struct Ollama {
    model: String,
    url: String,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

impl Ollama {
    pub fn new(model: String, url: String, timeout: Duration) -> Result<Self> {
        Ok(Self { model, url, client: http_client(timeout)? })
    }
}

#[async_trait]
impl CompletionProvider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    fn has_credential(&self) -> bool {
        true
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.model,
            messages: vec![Msg { role: "user", content: prompt }],
            stream: false,
            options: OllamaOptions { temperature: 0.7 },
        };

        tracing::debug!(model = %self.model, %url, "POST ollama chat");
        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &text));
        }

        // Some proxies return the bare content instead of the chat envelope.
        Ok(match serde_json::from_str::<ChatResponse>(&text) {
            Ok(c) => c.message.content,
            Err(_) => text,
        })
    }
}
