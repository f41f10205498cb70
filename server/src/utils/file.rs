//! File utility functions

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Expand `~`, `~/...` and relative paths into an absolute path.
///
/// An empty string resolves to the current directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if path.is_empty() {
        return cwd();
    }

    let expanded = match (path, dirs::home_dir()) {
        ("~", Some(home)) => home,
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    };

    if expanded.is_relative() {
        cwd().join(expanded)
    } else {
        expanded
    }
}

/// Read a whole file, refusing anything larger than `max_bytes`
pub async fn read_limited(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    if !metadata.is_file() {
        bail!("Not a file: {}", path.display());
    }
    if metadata.len() > max_bytes {
        bail!(
            "File too large: {} ({} bytes, limit {} bytes)",
            path.display(),
            metadata.len(),
            max_bytes
        );
    }

    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))
}
