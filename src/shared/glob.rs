//! Glob pattern utilities
//!
//! Exclude filters are shell-style globs matched against whole real paths,
//! so `*` is allowed to cross directory separators.

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

use crate::error::SweepError;

/// Check if a string contains glob pattern characters
pub fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

/// Create a GlobSet from a list of patterns for efficient batch matching
pub fn build_globset(patterns: &[String]) -> Result<GlobSet, SweepError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        if !is_glob_pattern(pattern) {
            tracing::debug!("Exclude pattern '{}' has no wildcards, matching literally", pattern);
        }
        let glob = Glob::new(pattern).map_err(|source| SweepError::InvalidExcludePattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }

    builder
        .build()
        .map_err(|source| SweepError::InvalidExcludePattern {
            pattern: patterns.join(", "),
            source,
        })
}

/// True when any pattern in `set` matches `path`
pub fn matches_any(set: &GlobSet, path: &Path) -> bool {
    set.is_match(path)
}
