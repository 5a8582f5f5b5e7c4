use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::ProviderError;

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod replay;

/// A text-completion backend: one prompt in, raw model text out.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the credential this backend needs is configured.
    fn has_credential(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

pub type DynProvider = Box<dyn CompletionProvider + Send + Sync>;

pub fn make_provider(cfg: &Config, replay: &[PathBuf]) -> Result<DynProvider> {
    if !replay.is_empty() {
        return Ok(Box::new(replay::ReplayProvider::from_files(replay)?));
    }
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let api_key = cfg.api_key();
    Ok(match cfg.provider {
        ProviderKind::Gemini => Box::new(gemini::GeminiProvider::new(
            cfg.model(),
            api_key,
            cfg.api_base.clone(),
            timeout,
        )?),
        ProviderKind::OpenAI => Box::new(openai::OpenAIProvider::new(
            cfg.model(),
            api_key,
            cfg.api_base.clone(),
            timeout,
        )?),
        ProviderKind::Anthropic => Box::new(anthropic::Anthropic::new(
            cfg.model(),
            api_key,
            cfg.api_base.clone(),
            timeout,
        )?),
        ProviderKind::Ollama => Box::new(ollama::Ollama::new(
            cfg.model(),
            cfg.ollama_url.clone(),
            timeout,
        )?),
    })
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

pub(crate) fn has_key(key: &Option<String>) -> bool {
    key.as_deref().is_some_and(|k| !k.trim().is_empty())
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed {
        message: String,
        #[serde(default, rename = "type")]
        kind: Option<String>,
    },
    Plain(String),
}

/// Turn a non-success HTTP answer into a `ProviderError`, keeping the status
/// and the most specific message the body offers.
pub(crate) fn error_from_response(status: u16, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error: ErrorBody::Detailed { message, kind: Some(kind) } }) => {
            format!("{kind}: {message}")
        }
        Ok(ErrorEnvelope { error: ErrorBody::Detailed { message, kind: None } }) => message,
        Ok(ErrorEnvelope { error: ErrorBody::Plain(message) }) => message,
        Err(_) => body.chars().take(200).collect(),
    };
    ProviderError::with_status(status, message)
}
