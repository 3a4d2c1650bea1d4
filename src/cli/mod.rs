//! Command-line interface for symsweep
//!
//! Every flag maps onto a [`SweepConfig`] key and overrides the file and
//! environment layers when given.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

mod output;

pub use output::Output;

use crate::config::SweepConfig;
use crate::dispatch::Sweep;

/// Runs find-all-symbols over all files in a compilation database.
#[derive(Parser, Debug)]
#[command(
    name = "symsweep",
    version = env!("CARGO_PKG_VERSION"),
    about = "Runs find-all-symbols over all files in a compilation database.",
    long_about = "Dispatches one find-all-symbols invocation per source file in \
                  compile_commands.json across a bounded worker pool, then merges \
                  the per-file results into a single symbol database."
)]
pub struct Cli {
    /// Path to the find-all-symbols binary
    #[arg(long, value_name = "PATH")]
    pub binary: Option<String>,

    /// Number of instances to run in parallel (0 = one per CPU)
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Directory containing the compilation database
    #[arg(short = 'p', long = "build-path", value_name = "DIR")]
    pub build_path: Option<PathBuf>,

    /// Only process files under this directory
    #[arg(long, value_name = "DIR")]
    pub only_under: Option<PathBuf>,

    /// Exclude files whose real path matches this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Additional argument to append to the compiler command line (repeatable)
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    pub extra_arg: Vec<String>,

    /// Additional argument to prepend to the compiler command line (repeatable)
    #[arg(long, value_name = "ARG", allow_hyphen_values = true)]
    pub extra_arg_before: Vec<String>,

    /// Where to write the merged symbol database
    #[arg(short = 'o', long = "saving-path", value_name = "PATH")]
    pub saving_path: Option<PathBuf>,

    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Flags that override configuration values; unset ones are dropped
#[derive(Serialize)]
struct CliOverrides<'a> {
    binary: Option<&'a str>,
    jobs: Option<usize>,
    build_path: Option<String>,
    only_under: Option<String>,
    exclude: &'a [String],
    extra_arg: &'a [String],
    extra_arg_before: &'a [String],
    saving_path: Option<&'a PathBuf>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides<'_> {
        CliOverrides {
            binary: self.binary.as_deref(),
            jobs: self.jobs,
            build_path: self.build_path.as_ref().map(|p| p.display().to_string()),
            only_under: self.only_under.as_ref().map(|p| p.display().to_string()),
            exclude: &self.exclude,
            extra_arg: &self.extra_arg,
            extra_arg_before: &self.extra_arg_before,
            saving_path: self.saving_path.as_ref(),
        }
    }

    pub fn run(self) -> Result<()> {
        // Change directory if specified
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
        }

        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        let config = SweepConfig::load(self.config.as_deref(), Some(self.overrides()))?;
        let sweep = Sweep::prepare(&config)?;
        output.step(&format!(
            "Running find-all-symbols with {} parallel jobs",
            sweep.parallelism()
        ));

        let summary = sweep.execute(&output)?;

        output.summary_stats("Files analyzed:", summary.selected);
        output.summary_stats("Succeeded:", summary.succeeded());
        let failed: Vec<_> = summary.failed().collect();
        output.summary_stats("Failed:", failed.len());
        if output.is_verbose() {
            for outcome in failed {
                output.list_item(outcome.file());
            }
        }
        Ok(())
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => tracing_subscriber::EnvFilter::new("warn"),
        1 => tracing_subscriber::EnvFilter::new("info,globset=warn"),
        2 => tracing_subscriber::EnvFilter::new("debug,globset=warn"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    });

    // try_init: tests may construct more than one CLI in a process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
