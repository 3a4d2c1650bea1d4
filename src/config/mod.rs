//! Configuration management for symsweep
//!
//! Settings come from layered sources merged with figment: the embedded
//! `default-config.toml`, user and repository config files (TOML, JSON or
//! YAML), `SYMSWEEP_*` environment variables and command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod loader;
pub mod overrides;
mod smart_load;

/// Fully merged settings for one sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Analysis binary; empty selects the default lookup
    #[serde(default)]
    pub binary: String,

    /// Parallel invocations, 0 = one per CPU
    #[serde(default)]
    pub jobs: usize,

    /// Directory holding the compilation database; empty searches upward
    #[serde(default)]
    pub build_path: String,

    pub database_name: String,

    /// Only analyze files below this directory; empty disables the filter
    #[serde(default)]
    pub only_under: String,

    /// Globs matched against each file's real path
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Appended to every compiler command line
    #[serde(default)]
    pub extra_arg: Vec<String>,

    /// Prepended to every compiler command line
    #[serde(default)]
    pub extra_arg_before: Vec<String>,

    /// Where the merged result is written
    pub saving_path: PathBuf,
}

impl SweepConfig {
    pub fn binary(&self) -> Option<&str> {
        non_empty(&self.binary)
    }

    pub fn build_path(&self) -> Option<&Path> {
        non_empty(&self.build_path).map(Path::new)
    }

    pub fn only_under(&self) -> Option<&Path> {
        non_empty(&self.only_under).map(Path::new)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(value) }
}
