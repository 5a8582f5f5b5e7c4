use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use fs_err as fs;
use parking_lot::Mutex;
use std::path::PathBuf;

use super::CompletionProvider;
use crate::errors::ProviderError;

/// Serves previously saved model answers, one file per call, in order. The
/// last answer repeats once the list is exhausted.
pub struct ReplayProvider {
    responses: Vec<String>,
    cursor: Mutex<usize>,
}

impl ReplayProvider {
    pub fn new(responses: Vec<String>) -> Result<Self> {
        if responses.is_empty() {
            bail!("replay provider needs at least one response");
        }
        Ok(Self { responses, cursor: Mutex::new(0) })
    }

    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let responses = paths
            .iter()
            .map(|p| {
                fs::read_to_string(p).with_context(|| format!("reading replay file {}", p.display()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(responses)
    }
}

#[async_trait]
impl CompletionProvider for ReplayProvider {
    fn name(&self) -> &str {
        "replay"
    }

    fn has_credential(&self) -> bool {
        true
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        let mut cursor = self.cursor.lock();
        let idx = (*cursor).min(self.responses.len() - 1);
        *cursor += 1;
        Ok(self.responses[idx].clone())
    }
}
