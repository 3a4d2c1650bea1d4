//! Compilation database access
//!
//! Locating `compile_commands.json`, loading its entries and selecting the
//! source files that get dispatched to the analysis tool.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::SweepError;

pub mod locator;
pub mod selector;

pub use locator::find_compilation_database;
pub use selector::{FileSelector, SelectionFilters};

/// Default compilation database file name
pub const DEFAULT_DATABASE_NAME: &str = "compile_commands.json";

/// One translation unit from the compilation database.
///
/// Only `file` is dispatched; `directory` resolves relative paths while
/// filtering. The compile command itself is carried along untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilationDatabaseEntry {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

impl CompilationDatabaseEntry {
    /// Absolute location of the entry's file, resolving against `directory`
    /// when the file is relative and following symlinks when it exists.
    pub fn real_path(&self) -> PathBuf {
        let file = Path::new(&self.file);
        let joined = match (&self.directory, file.is_relative()) {
            (Some(dir), true) => dir.join(file),
            _ => file.to_path_buf(),
        };
        real_path(&joined)
    }
}

/// Parsed compilation database
#[derive(Debug)]
pub struct CompilationDatabase {
    pub path: PathBuf,
    pub entries: Vec<CompilationDatabaseEntry>,
}

impl CompilationDatabase {
    /// Load `name` from `build_path`
    pub fn load(build_path: &Path, name: &str) -> Result<Self, SweepError> {
        let path = build_path.join(name);
        let content = std::fs::read_to_string(&path).map_err(|source| {
            SweepError::DatabaseUnreadable {
                path: path.clone(),
                source,
            }
        })?;
        let entries: Vec<CompilationDatabaseEntry> = serde_json::from_str(&content)
            .map_err(|source| SweepError::DatabaseInvalid {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Loaded {} entries from {}", entries.len(), path.display());
        Ok(Self { path, entries })
    }
}

/// Symlink-resolved absolute form of `path`.
///
/// Falls back to a lexical absolute path when the file does not exist, so
/// stale database entries can still be filtered by location.
pub fn real_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
