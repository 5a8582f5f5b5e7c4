use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{error_from_response, has_key, http_client, CompletionProvider};
use crate::errors::ProviderError;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    model: String,
    api_key: Option<String>,
    api_base: String,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
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

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn has_credential(&self) -> bool {
        has_key(&self.api_key)
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let key = self.api_key.as_deref().unwrap_or_default();
        let body = GenerateRequest {
            contents: vec![Content { role: "user", parts: vec![Part { text: prompt }] }],
            generation_config: GenerationConfig { temperature: 0.7, max_output_tokens: 8192 },
        };

        tracing::debug!(model = %self.model, "POST gemini generateContent");
        let resp = self
            .client
            .post(self.url())
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(error_from_response(status.as_u16(), &text));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::new(format!("gemini response parse error: {e}")))?;

        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect::<String>())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_config() {
        let body = GenerateRequest {
            contents: vec![Content { role: "user", parts: vec![Part { text: "hi" }] }],
            generation_config: GenerationConfig { temperature: 0.5, max_output_tokens: 10 },
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 10);
    }

    #[test]
    fn url_trims_trailing_slash() {
        let p = GeminiProvider::new(
            "gemini-1.5-flash".into(),
            Some("k".into()),
            Some("http://localhost:9/".into()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(p.url(), "http://localhost:9/models/gemini-1.5-flash:generateContent");
        assert!(p.has_credential());
    }
}
