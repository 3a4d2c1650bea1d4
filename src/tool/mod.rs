//! External analysis tool invocation
//!
//! The analysis binary is opaque: it is driven through its command line and
//! observed only through exit status. Per-file runs are best effort and yield
//! an [`ItemOutcome`]; the merge run returns a `Result` that ends the sweep
//! on failure.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::SweepError;

/// Tool looked up on `PATH` when no binary is configured
pub const DEFAULT_BINARY_NAME: &str = "find-all-symbols";

/// Fallback location relative to the working directory
pub const FALLBACK_BINARY_PATH: &str = "./bin/find-all-symbols";

/// Result of one per-file invocation, kept for diagnostics only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Succeeded { file: String },
    Failed { file: String, reason: String },
}

impl ItemOutcome {
    pub fn file(&self) -> &str {
        match self {
            ItemOutcome::Succeeded { file } | ItemOutcome::Failed { file, .. } => file,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Succeeded { .. })
    }
}

/// Arguments shared by every per-file invocation of one run
#[derive(Debug, Clone, Default)]
pub struct InvocationArgs {
    pub build_path: PathBuf,
    pub extra_arg_before: Vec<String>,
    pub extra_arg: Vec<String>,
}

/// Handle on the resolved analysis binary
#[derive(Debug, Clone)]
pub struct AnalysisTool {
    binary: PathBuf,
}

impl AnalysisTool {
    /// Resolve the binary, failing before any work starts if it is missing
    /// or not executable.
    ///
    /// With no explicit binary, `find-all-symbols` is looked up on `PATH` and
    /// `./bin/find-all-symbols` is the fallback. A name is accepted when it
    /// resolves on `PATH` or names an existing executable file.
    pub fn resolve(binary: Option<&str>) -> Result<Self, SweepError> {
        let requested = match binary {
            Some(binary) if !binary.is_empty() => binary.to_string(),
            _ => which::which(DEFAULT_BINARY_NAME)
                .map(|path| path.display().to_string())
                .unwrap_or_else(|_| FALLBACK_BINARY_PATH.to_string()),
        };

        if let Ok(found) = which::which(&requested) {
            tracing::debug!("Using analysis binary {}", found.display());
            return Ok(Self { binary: found });
        }

        let path = PathBuf::from(&requested);
        if is_executable(&path) {
            tracing::debug!("Using analysis binary {}", path.display());
            return Ok(Self { binary: path });
        }

        Err(SweepError::BinaryNotFound { binary: requested })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments for analyzing one file
    pub fn file_arguments(file: &str, output_dir: &Path, args: &InvocationArgs) -> Vec<String> {
        let mut argv = vec![
            file.to_string(),
            format!("-output-dir={}", output_dir.display()),
            format!("-p={}", args.build_path.display()),
        ];
        argv.extend(
            args.extra_arg_before
                .iter()
                .map(|arg| format!("--extra-arg-before={arg}")),
        );
        argv.extend(args.extra_arg.iter().map(|arg| format!("--extra-arg={arg}")));
        argv
    }

    /// Arguments for merging a staging directory into `output`
    pub fn merge_arguments(merge_dir: &Path, output: &Path) -> Vec<String> {
        vec![
            format!("-merge-dir={}", merge_dir.display()),
            output.display().to_string(),
        ]
    }

    /// Human-readable command line, as echoed before each run
    pub fn command_line(&self, argv: &[String]) -> String {
        std::iter::once(self.binary.display().to_string())
            .chain(argv.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Analyze a single file into `output_dir`.
    ///
    /// Never fails the caller: spawn errors and non-zero exits come back as
    /// [`ItemOutcome::Failed`].
    pub fn analyze_file(&self, file: &str, output_dir: &Path, args: &InvocationArgs) -> ItemOutcome {
        let argv = Self::file_arguments(file, output_dir, args);
        match self.run(&argv) {
            Ok(status) if status.success() => ItemOutcome::Succeeded {
                file: file.to_string(),
            },
            Ok(status) => ItemOutcome::Failed {
                file: file.to_string(),
                reason: format!("exited with {status}"),
            },
            Err(e) => ItemOutcome::Failed {
                file: file.to_string(),
                reason: format!("{e:#}"),
            },
        }
    }

    /// Merge every artifact in `merge_dir` into `output`
    pub fn merge(&self, merge_dir: &Path, output: &Path) -> Result<()> {
        let argv = Self::merge_arguments(merge_dir, output);
        tracing::info!("Merging {} into {}", merge_dir.display(), output.display());

        let status = self.run(&argv)?;
        if !status.success() {
            return Err(SweepError::MergeFailed { status }.into());
        }
        Ok(())
    }

    fn run(&self, argv: &[String]) -> Result<ExitStatus> {
        tracing::trace!("exec {}", self.command_line(argv));
        Command::new(&self.binary)
            .args(argv)
            .status()
            .with_context(|| format!("Failed to execute {}", self.binary.display()))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
