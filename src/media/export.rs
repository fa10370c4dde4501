//! Exporting takes out of the scratch store.
//!
//! Every export uses the same configured base name; the take's extension is
//! appended and a numeric suffix resolves collisions, mirroring how browsers
//! treat repeated downloads of the same attachment name.

use crate::media::take::Take;
use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Copies a take's audio into `dir` under `stem` plus the take's extension.
///
/// Existing files are never overwritten; `stem-1`, `stem-2`, ... are tried
/// until a free name is found.
///
/// # Errors
/// - If the destination directory cannot be created
/// - If the copy fails
pub fn export_take(take: &Take, dir: &Path, stem: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .map_err(|e| anyhow!("Failed to create export directory {}: {e}", dir.display()))?;

    let destination = unique_destination(dir, stem, take.handle().extension());

    fs::copy(take.path(), &destination).map_err(|e| {
        anyhow!(
            "Failed to export {} to {}: {e}",
            take.path().display(),
            destination.display()
        )
    })?;

    tracing::info!("Exported take to {}", destination.display());
    Ok(destination)
}

/// Picks the first free `stem.ext`, `stem-1.ext`, `stem-2.ext`, ... in `dir`.
fn unique_destination(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let first = dir.join(format!("{stem}.{extension}"));
    if !first.exists() {
        return first;
    }

    let mut suffix = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}-{suffix}.{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        suffix += 1;
    }
}
