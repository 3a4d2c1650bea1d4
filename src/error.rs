//! Fatal error taxonomy for a sweep run
//!
//! Everything that ends a run early with a specific exit status is a
//! [`SweepError`]. Plumbing errors travel as `anyhow::Error` and are downcast
//! back to this type at the process boundary to choose the exit code.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("find-all-symbols binary not found or not executable: {binary}. Use --binary to set it.")]
    BinaryNotFound { binary: String },

    #[error("could not find compilation database '{name}' in {} or any parent directory", .start.display())]
    DatabaseNotFound { name: String, start: PathBuf },

    #[error("failed to read compilation database {}: {source}", .path.display())]
    DatabaseUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse compilation database {}: {source}", .path.display())]
    DatabaseInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("merge failed with {status}")]
    MergeFailed { status: std::process::ExitStatus },
}

impl SweepError {
    /// Process exit code for this error.
    ///
    /// A failed merge hands the tool's own status back to the caller; a
    /// signal-terminated merge has no code and maps to `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            SweepError::MergeFailed { status } => status.code().filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

/// Exit code for an arbitrary error surfaced by a run
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<SweepError>()
        .map(SweepError::exit_code)
        .unwrap_or(1)
}
