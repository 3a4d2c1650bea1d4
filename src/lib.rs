//! # symsweep - parallel find-all-symbols runner
//!
//! symsweep runs an external per-file analysis tool (clang's
//! `find-all-symbols` by default) over every source file in a compilation
//! database, then merges the per-file results into one symbol database.
//!
//! ## Pipeline
//!
//! 1. Locate `compile_commands.json` by walking up from the working directory
//!    (or take `-p DIR`).
//! 2. Select source files: recognized extensions, `--only-under`,
//!    `--exclude` globs, database order preserved.
//! 3. Feed them to a bounded pool of detached worker threads, each running
//!    the tool once per file into a shared staging directory.
//! 4. Wait for every file, then run the tool in merge mode.
//! 5. Remove the staging directory, whatever happened.
//!
//! A failing file is reported and skipped; a failing merge fails the run.
//!
//! ## Quick Start
//!
//! ```bash
//! # Use every CPU, find the database automatically
//! symsweep
//!
//! # Eight jobs, explicit build dir, skip vendored code
//! symsweep -j 8 -p build --exclude '*/third_party/*' -o symbols.yaml
//! ```

pub mod cli;
pub mod config;
pub mod database;
pub mod dispatch;
pub mod error;
pub mod parallel;
pub mod shared;
pub mod staging;
pub mod tool;

pub use cli::{Cli, Output};
pub use config::SweepConfig;
pub use error::SweepError;

/// Result type alias for symsweep operations
pub type Result<T> = anyhow::Result<T>;
