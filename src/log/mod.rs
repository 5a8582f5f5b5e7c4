use anyhow::Result;
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::plan::Generated;

pub const LOG_ENV: &str = "FITPLAN_LOG";

/// Install the global subscriber. `FITPLAN_LOG` takes `EnvFilter` syntax;
/// `--debug` wins over it. Logs go to stderr so JSON output stays clean.
pub fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
    };
    // A second init (tests, embedding) is not an error worth surfacing.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[derive(Debug)]
pub struct SavedPaths {
    pub dir: PathBuf,
    pub prompt: PathBuf,
    pub response: Option<PathBuf>,
    pub plan: PathBuf,
}

pub fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join(".fitplan").join("tx").join(tx.to_string())
}

/// Write the transcript of one generation stage. Fallback results carry no
/// model text, so their response file is skipped.
pub fn save_stage<T: Serialize>(
    root: &Path,
    tx: Uuid,
    stage: &str,
    prompt: &str,
    generated: &Generated<T>,
) -> Result<SavedPaths> {
    let dir = tx_dir(root, tx);
    fs::create_dir_all(&dir)?;

    let prompt_path = dir.join(format!("{stage}.prompt.txt"));
    fs::write(&prompt_path, prompt)?;

    let mut response_path = None;
    if let Some(raw) = &generated.raw_response {
        let p = dir.join(format!("{stage}.response.txt"));
        fs::write(&p, raw)?;
        response_path = Some(p);
    }

    let plan_path = dir.join(format!("{stage}.plan.json"));
    fs::write(&plan_path, to_string_pretty(generated)?)?;

    let saved = SavedPaths { dir, prompt: prompt_path, response: response_path, plan: plan_path };
    print_saved_paths(stage, &saved);
    Ok(saved)
}

fn print_saved_paths(stage: &str, saved: &SavedPaths) {
    tracing::debug!(stage, dir = %saved.dir.display(), "artifacts saved");
    match &saved.response {
        Some(p) => tracing::debug!(stage, path = %p.display(), "response saved"),
        None => tracing::debug!(stage, "no model response to save"),
    }
}
