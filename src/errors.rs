use thiserror::Error;

/// Failure reported by a provider adapter for a single completion attempt.
///
/// Carries the HTTP status when one was observed so the retry classifier can
/// tell overload apart from every other transport or protocol failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render_provider_error(.status, .message))]
pub struct ProviderError {
    pub status: Option<u16>,
    pub message: String,
}

fn render_provider_error(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("provider returned {code}: {message}"),
        None => format!("provider error: {message}"),
    }
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { status: None, message: message.into() }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self { status: Some(status), message: message.into() }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// Errors surfaced by the completion client to its callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("no credential configured for provider '{0}'")]
    MissingCredential(String),
    #[error("service overloaded after {attempts} attempt(s)")]
    ServiceOverloaded { attempts: u32 },
    #[error("empty completion after {attempts} attempt(s)")]
    EmptyResponse { attempts: u32 },
    #[error("communication error: {0}")]
    Communication(String),
}

impl CompletionError {
    /// Configuration errors are never absorbed by a fallback.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CompletionError::MissingCredential(_))
    }
}
