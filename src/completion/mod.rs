use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::CompletionError;
use crate::provider::DynProvider;
use crate::retry::{classify, Class, RetryPolicy};

/// Sends prompts to a provider, retrying overload and empty answers on the
/// policy's linear schedule. Each call is independent; the backoff sleep only
/// suspends the calling task.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<DynProvider>,
    policy: RetryPolicy,
}

impl CompletionClient {
    pub fn new(provider: DynProvider, policy: RetryPolicy) -> Self {
        Self { provider: Arc::new(provider), policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Complete with the client's own attempt budget.
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.complete_with_retries(prompt, self.policy.max_attempts).await
    }

    /// Complete with an explicit attempt budget (`max_retries` total calls).
    pub async fn complete_with_retries(
        &self,
        prompt: &str,
        max_retries: u32,
    ) -> Result<String, CompletionError> {
        if !self.provider.has_credential() {
            return Err(CompletionError::MissingCredential(self.provider.name().to_string()));
        }
        let policy = self.policy.with_max_attempts(max_retries);

        let mut attempt = 1u32;
        loop {
            debug!(provider = self.provider.name(), attempt, "awaiting completion");
            let class = match self.provider.generate(prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(provider = self.provider.name(), attempt, bytes = text.len(), "completion received");
                    return Ok(text);
                }
                Ok(_) => {
                    warn!(attempt, "empty completion");
                    Class::Empty
                }
                Err(e) => match classify(&e) {
                    Class::Fatal => {
                        warn!(attempt, error = %e, "completion failed");
                        return Err(CompletionError::Communication(e.to_string()));
                    }
                    class => {
                        warn!(attempt, error = %e, "service overloaded");
                        class
                    }
                },
            };

            match policy.delay_after(attempt) {
                Some(delay) => {
                    info!(attempt, delay_ms = delay.as_millis() as u64, "retrying completion");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    return Err(match class {
                        Class::Empty => CompletionError::EmptyResponse { attempts: attempt },
                        _ => CompletionError::ServiceOverloaded { attempts: attempt },
                    });
                }
            }
        }
    }
}
