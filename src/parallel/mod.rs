//! Bounded worker pool with a completion barrier
//!
//! The dispatcher feeds file paths into a [`WorkerPool`] whose queue holds at
//! most one item per worker, then blocks on [`WorkerPool::join`] until every
//! submitted item has been processed.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ put (blocks when full) ┌─────────────┐ get  ┌──────────────┐
//! │ Coordinator  │───────────────────────▶│  WorkQueue  │─────▶│ worker-0..N  │
//! │              │◀── join (unfinished=0) │  cap = N    │◀─────│ (detached)   │
//! └──────────────┘                        └─────────────┘ done └──────────────┘
//! ```
//!
//! Worker threads are detached: the pool never signals them to stop and never
//! joins them. Completion is counted per item, so workers may outlive the
//! batch without holding up process exit.
//!
//! # Example
//!
//! ```rust
//! use symsweep::parallel::WorkerPool;
//!
//! let pool = WorkerPool::start(4, |item: &u32, _worker_id| item * 2)?;
//! for item in 0..10 {
//!     pool.submit(item);
//! }
//! let results = pool.join();
//! assert_eq!(results.len(), 10);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod pool;
pub mod queue;

pub use pool::WorkerPool;
pub use queue::{Claimed, WorkQueue};

/// Worker count to use when none was configured
pub fn default_parallelism() -> usize {
    num_cpus::get().max(1)
}

/// Resolve a configured job count; `0` means one worker per CPU
pub fn resolve_parallelism(jobs: usize) -> usize {
    if jobs == 0 { default_parallelism() } else { jobs }
}
