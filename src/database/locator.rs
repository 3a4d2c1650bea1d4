use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::error::SweepError;

/// Walk upward from `start` until a directory containing `name` is found.
///
/// Returns the canonical path of that directory. Reaching the filesystem
/// root without a match is a [`SweepError::DatabaseNotFound`].
pub fn find_compilation_database<P: AsRef<Path>>(name: &str, start: P) -> Result<PathBuf> {
    let start = start.as_ref();
    let start = start
        .canonicalize()
        .with_context(|| format!("Failed to resolve search start {}", start.display()))?;

    for dir in start.ancestors() {
        tracing::trace!("Looking for {} in {}", name, dir.display());
        if dir.join(name).is_file() {
            tracing::debug!("Found {} in {}", name, dir.display());
            return Ok(dir.to_path_buf());
        }
    }

    Err(SweepError::DatabaseNotFound {
        name: name.to_string(),
        start,
    }
    .into())
}
