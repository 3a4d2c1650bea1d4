//! Sweep orchestration
//!
//! Resolves the tool and database, selects files, fans them out to the
//! worker pool inside a scoped staging directory, then merges.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::Output;
use crate::config::SweepConfig;
use crate::database::{CompilationDatabase, FileSelector, SelectionFilters, find_compilation_database};
use crate::parallel::{WorkerPool, resolve_parallelism};
use crate::staging::StagingDir;
use crate::tool::{AnalysisTool, InvocationArgs, ItemOutcome};

/// Everything a sweep needs, resolved and validated before any work starts
#[derive(Debug, Clone)]
pub struct Sweep {
    tool: AnalysisTool,
    build_path: PathBuf,
    database_name: String,
    filters: SelectionFilters,
    parallelism: usize,
    invocation: InvocationArgs,
    saving_path: PathBuf,
}

/// What a finished sweep did
#[derive(Debug)]
pub struct SweepSummary {
    pub selected: usize,
    pub outcomes: Vec<ItemOutcome>,
    pub workers: usize,
    pub output: PathBuf,
}

impl SweepSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

impl Sweep {
    /// Resolve the binary and the build path.
    ///
    /// Both are fatal preconditions checked before the staging directory
    /// exists or any worker starts.
    pub fn prepare(config: &SweepConfig) -> Result<Self> {
        let tool = AnalysisTool::resolve(config.binary())?;

        let build_path = match config.build_path() {
            Some(path) => path.to_path_buf(),
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                find_compilation_database(&config.database_name, cwd)?
            }
        };
        tracing::info!("Build path: {}", build_path.display());

        Ok(Self {
            tool,
            build_path: build_path.clone(),
            database_name: config.database_name.clone(),
            filters: SelectionFilters {
                only_under: config.only_under().map(PathBuf::from),
                exclude: config.exclude.clone(),
            },
            parallelism: resolve_parallelism(config.jobs),
            invocation: InvocationArgs {
                build_path,
                extra_arg_before: config.extra_arg_before.clone(),
                extra_arg: config.extra_arg.clone(),
            },
            saving_path: config.saving_path.clone(),
        })
    }

    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Run the sweep with a fresh staging directory in the system temp dir
    pub fn execute(self, output: &Output) -> Result<SweepSummary> {
        let staging = StagingDir::create()?;
        self.execute_in(staging, output)
    }

    /// Run the sweep using `staging`, which is removed when this returns
    pub fn execute_in(self, staging: StagingDir, output: &Output) -> Result<SweepSummary> {
        let start_time = Instant::now();

        let database = CompilationDatabase::load(&self.build_path, &self.database_name)?;
        let selector = FileSelector::new(&self.filters)?;
        let files = selector.select(&database);
        let selected = files.len();
        tracing::info!(
            "Selected {} of {} database entries",
            selected,
            database.entries.len()
        );

        let outcomes = self.dispatch(files, &staging, output)?;

        self.tool.merge(staging.path(), &self.saving_path)?;
        output.success(&format!(
            "Merge is finished. Saving results in {}",
            self.saving_path.display()
        ));

        tracing::info!(
            "Sweep finished in {:.2}s ({} files, {} workers)",
            start_time.elapsed().as_secs_f64(),
            selected,
            self.parallelism
        );

        Ok(SweepSummary {
            selected,
            outcomes,
            workers: self.parallelism,
            output: self.saving_path,
        })
    }

    /// Fan `files` out to the pool and wait for every one of them
    fn dispatch(&self, files: Vec<String>, staging: &StagingDir, output: &Output) -> Result<Vec<ItemOutcome>> {
        let tool = Arc::new(self.tool.clone());
        let invocation = Arc::new(self.invocation.clone());
        let staging_path = staging.path().to_path_buf();
        let output = *output;

        let pool = WorkerPool::start(self.parallelism, move |file: &String, worker_id| {
            let argv = AnalysisTool::file_arguments(file, &staging_path, &invocation);
            output.command(&tool.command_line(&argv));
            tracing::debug!("worker-{}: analyzing {}", worker_id, file);

            let outcome = tool.analyze_file(file, &staging_path, &invocation);
            if let ItemOutcome::Failed { file, reason } = &outcome {
                tracing::warn!("worker-{}: {} failed: {}", worker_id, file, reason);
                output.warning(&format!("{file}: {reason}"));
            }
            outcome
        })?;

        let selected = files.clone();
        for file in files {
            pool.submit(file);
        }
        let outcomes = pool.join();
        if pool.panicked() > 0 {
            output.warning(&format!("{} analysis worker(s) panicked", pool.panicked()));
        }
        Ok(with_lost_items(selected, outcomes))
    }
}

/// Report every selected file that produced no outcome as failed.
///
/// Items whose processor panicked are released by the pool without a
/// result; they still count against the run.
fn with_lost_items(selected: Vec<String>, mut outcomes: Vec<ItemOutcome>) -> Vec<ItemOutcome> {
    if outcomes.len() == selected.len() {
        return outcomes;
    }

    let mut reported: HashMap<String, usize> = HashMap::new();
    for outcome in &outcomes {
        *reported.entry(outcome.file().to_string()).or_default() += 1;
    }
    for file in selected {
        match reported.get_mut(&file) {
            Some(count) if *count > 0 => *count -= 1,
            _ => outcomes.push(ItemOutcome::Failed {
                file,
                reason: "analysis worker panicked".to_string(),
            }),
        }
    }
    outcomes
}
