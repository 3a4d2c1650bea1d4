//! Scoped staging directory for per-file artifacts
//!
//! One [`StagingDir`] exists per sweep. It is created before the workers
//! start and removed, recursively and ignoring errors, when the value is
//! dropped, which covers every exit path of the dispatch-and-merge sequence.

use anyhow::{Context, Result};
use std::path::Path;
use tempfile::TempDir;

const STAGING_PREFIX: &str = "symsweep-";

pub struct StagingDir {
    dir: Option<TempDir>,
}

impl StagingDir {
    /// Create a fresh, uniquely named directory under the system temp dir
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir()
            .context("Failed to create staging directory")?;
        tracing::debug!("Created staging directory {}", dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    /// Create the staging directory under `parent` instead of the temp dir
    pub fn create_in<P: AsRef<Path>>(parent: P) -> Result<Self> {
        let parent = parent.as_ref();
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .with_context(|| format!("Failed to create staging directory in {}", parent.display()))?;
        tracing::debug!("Created staging directory {}", dir.path().display());
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::debug!("Ignoring staging cleanup error for {}: {}", path.display(), e);
            } else {
                tracing::debug!("Removed staging directory {}", path.display());
            }
        }
    }
}
