use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::service::FailurePolicy;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    #[value(alias = "open-ai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    /// Environment variable holding the API key, if the backend needs one.
    pub fn env_var(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => Some("GEMINI_API_KEY"),
            ProviderKind::OpenAI => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Ollama => None,
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::OpenAI => "gpt-4.1-mini",
            ProviderKind::Anthropic => "claude-3-5-haiku-latest",
            ProviderKind::Ollama => "llama3.1",
        }
    }
}

/// Which generation(s) to run.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Workout,
    Nutrition,
    Goals,
    All,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Text,
}

/// Flags left unset fall through to the config file and its defaults.
#[derive(Parser, Debug)]
#[command(name = "fitplan", version, about = "Generate normalised workout and nutrition plans from a user profile")]
pub struct Args {
    /// Profile file (.json, .yaml/.yml or .toml).
    #[arg(long)]
    pub profile: PathBuf,

    #[arg(long, value_enum, default_value_t = Kind::All)]
    pub kind: Kind,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    /// Total completion attempts, the first one included.
    #[arg(long)]
    pub max_retries: Option<u32>,

    #[arg(long, value_enum)]
    pub on_failure: Option<FailurePolicy>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long)]
    pub root: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Serve these saved responses instead of calling a provider.
    #[arg(long, num_args = 1..)]
    pub replay: Vec<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub save_artifacts: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub progress: bool,
}
