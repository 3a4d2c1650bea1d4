use globset::GlobSet;
use std::path::{Path, PathBuf};

use super::{CompilationDatabase, CompilationDatabaseEntry, real_path};
use crate::error::SweepError;
use crate::shared::glob::{build_globset, matches_any};

/// Extensions handed to the analysis tool (compared case-insensitively)
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "m", "mm"];

/// User-configured narrowing of the selected file set
#[derive(Debug, Clone, Default)]
pub struct SelectionFilters {
    /// Keep only files strictly below this directory
    pub only_under: Option<PathBuf>,
    /// Drop files whose real path matches any of these globs
    pub exclude: Vec<String>,
}

/// Picks the files from a compilation database that get analyzed.
///
/// Filters run in a fixed order: extension, `.rc` removal, only-under,
/// excludes. The output keeps database order.
pub struct FileSelector {
    only_under: Option<PathBuf>,
    exclude: Option<GlobSet>,
}

impl FileSelector {
    pub fn new(filters: &SelectionFilters) -> Result<Self, SweepError> {
        let only_under = filters.only_under.as_deref().map(real_path);
        let exclude = if filters.exclude.is_empty() {
            None
        } else {
            Some(build_globset(&filters.exclude)?)
        };

        Ok(Self {
            only_under,
            exclude,
        })
    }

    pub fn select(&self, database: &CompilationDatabase) -> Vec<String> {
        self.select_entries(&database.entries)
    }

    pub fn select_entries(&self, entries: &[CompilationDatabaseEntry]) -> Vec<String> {
        let mut candidates: Vec<&CompilationDatabaseEntry> = entries
            .iter()
            .filter(|entry| is_source_file(&entry.file))
            .filter(|entry| !entry.file.ends_with(".rc"))
            .collect();
        tracing::debug!("{} source files in database", candidates.len());

        if let Some(root) = &self.only_under {
            candidates.retain(|entry| is_strictly_under(&entry.real_path(), root));
            tracing::debug!("{} files under {}", candidates.len(), root.display());
        }

        if let Some(exclude) = &self.exclude {
            candidates.retain(|entry| {
                let path = entry.real_path();
                let excluded = matches_any(exclude, &path);
                if excluded {
                    tracing::trace!("Excluding {}", path.display());
                }
                !excluded
            });
        }

        candidates
            .into_iter()
            .map(|entry| entry.file.clone())
            .collect()
    }
}

/// True when the file's extension is one of [`SOURCE_EXTENSIONS`]
pub fn is_source_file(file: &str) -> bool {
    Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SOURCE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Component-wise descendant check; `root` itself does not count.
fn is_strictly_under(path: &Path, root: &Path) -> bool {
    path != root && path.starts_with(root)
}
