use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::{Args, ProviderKind};
use crate::retry::RetryPolicy;
use crate::service::FailurePolicy;

/// Runtime settings. Built from defaults, then an optional TOML file, then
/// CLI flags. The API key itself only ever comes from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    /// Falls back to the provider's default model when unset.
    pub model: Option<String>,
    /// Name of the environment variable holding the key, if not the provider's usual one.
    pub api_key_env: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_step_ms: u64,
    pub on_failure: FailurePolicy,
    pub root: PathBuf,
    pub ollama_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: None,
            api_key_env: None,
            api_base: None,
            timeout_secs: 60,
            max_retries: 3,
            backoff_step_ms: 2000,
            on_failure: FailurePolicy::Fallback,
            root: PathBuf::from("."),
            ollama_url: "http://localhost:11434".into(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.provider {
            if p != self.provider {
                // A model picked for another backend would not resolve.
                self.model = None;
            }
            self.provider = p;
        }
        if let Some(m) = &args.model {
            self.model = Some(m.clone());
        }
        if let Some(n) = args.max_retries {
            self.max_retries = n;
        }
        if let Some(p) = args.on_failure {
            self.on_failure = p;
        }
        if let Some(t) = args.timeout_secs {
            self.timeout_secs = t;
        }
        if let Some(r) = &args.root {
            self.root = r.clone();
        }
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    pub fn api_key_var(&self) -> Option<&str> {
        self.api_key_env.as_deref().or(self.provider.env_var())
    }

    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    pub(crate) fn api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key_var().and_then(lookup)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.backoff_step_ms))
    }
}
