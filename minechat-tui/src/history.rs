//! Chat history file: preload on startup, append-only logging after.
//!
//! The engine's persist queue delivers raw feed lines (trailing newline
//! intact); this module stamps and appends them. Formatting lives here,
//! on the consumer side of the queue, so the engine stays free of any
//! file-format knowledge.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

/// Read previously logged lines for preloading into the conversation
/// pane. A missing file is an empty history, not an error.
pub fn load(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents.lines().map(str::to_string).collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "can't read history file");
            Vec::new()
        }
    }
}

/// Drain the persist queue into the history file until the engine side
/// closes it.
pub async fn run_logger(path: PathBuf, mut persist: mpsc::UnboundedReceiver<String>) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await
        .with_context(|| format!("opening history file {}", path.display()))?;

    while let Some(line) = persist.recv().await {
        let stamped = format!("[{}] {line}", chrono::Local::now().format("%d.%m.%y %H:%M"));
        file.write_all(stamped.as_bytes()).await?;
    }
    Ok(())
}
