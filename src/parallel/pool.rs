use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::queue::WorkQueue;

/// Fixed set of detached worker threads draining a [`WorkQueue`].
///
/// Workers are never stopped: once the queue drains they stay blocked on it
/// and the process may exit underneath them. Completion is tracked by the
/// queue's join barrier, not by joining threads.
///
/// A panicking processor costs only its item: the worker catches the
/// unwind, records it and keeps draining. Panicked items yield no result.
pub struct WorkerPool<T, R> {
    queue: WorkQueue<T>,
    result_rx: Receiver<R>,
    workers: usize,
    completed: Arc<AtomicUsize>,
    panicked: Arc<AtomicUsize>,
}

/// Context for worker threads to avoid too many function parameters
struct WorkerContext<T, R, F> {
    worker_id: usize,
    queue: WorkQueue<T>,
    result_tx: Sender<R>,
    completed: Arc<AtomicUsize>,
    panicked: Arc<AtomicUsize>,
    processor: Arc<F>,
}

impl<T, R> WorkerPool<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Start `workers` threads, each feeding dequeued items to `processor`.
    ///
    /// The queue capacity equals the worker count.
    pub fn start<F>(workers: usize, processor: F) -> Result<Self>
    where
        F: Fn(&T, usize) -> R + Send + Sync + 'static,
    {
        let workers = workers.max(1);
        let queue = WorkQueue::new(workers);
        let (result_tx, result_rx) = unbounded();
        let completed = Arc::new(AtomicUsize::new(0));
        let panicked = Arc::new(AtomicUsize::new(0));
        let processor = Arc::new(processor);

        for worker_id in 0..workers {
            let ctx = WorkerContext {
                worker_id,
                queue: queue.clone(),
                result_tx: result_tx.clone(),
                completed: completed.clone(),
                panicked: panicked.clone(),
                processor: processor.clone(),
            };

            // Handle dropped on purpose: workers are detached
            std::thread::Builder::new()
                .name(format!("sweep-worker-{worker_id}"))
                .spawn(move || worker_thread(ctx))
                .with_context(|| format!("Failed to spawn worker thread {worker_id}"))?;
        }

        tracing::debug!("Started {} workers", workers);
        Ok(Self {
            queue,
            result_rx,
            workers,
            completed,
            panicked,
        })
    }

    /// Enqueue one item, blocking while the queue is full
    pub fn submit(&self, item: T) {
        self.queue.put(item);
    }

    /// Wait until every submitted item has been processed and return the
    /// results produced since the last call, in completion order.
    pub fn join(&self) -> Vec<R> {
        self.queue.join();
        // Each worker sends its result before releasing the item, so the
        // channel already holds everything once the barrier opens
        self.result_rx.try_iter().collect()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Items fully processed so far
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Items whose processor panicked; these produced no result
    pub fn panicked(&self) -> usize {
        self.panicked.load(Ordering::Acquire)
    }
}

fn worker_thread<T, R, F>(ctx: WorkerContext<T, R, F>)
where
    F: Fn(&T, usize) -> R,
{
    while let Some(item) = ctx.queue.get() {
        let processed = panic::catch_unwind(AssertUnwindSafe(|| (ctx.processor)(&*item, ctx.worker_id)));

        match processed {
            Ok(result) => {
                if ctx.result_tx.send(result).is_err() {
                    tracing::trace!("worker-{}: result receiver gone", ctx.worker_id);
                }
            }
            Err(payload) => {
                tracing::error!("worker-{}: item panicked: {}", ctx.worker_id, panic_message(&*payload));
                ctx.panicked.fetch_add(1, Ordering::AcqRel);
            }
        }
        ctx.completed.fetch_add(1, Ordering::AcqRel);
        // Releasing the claim marks the item done for join()
        drop(item);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
