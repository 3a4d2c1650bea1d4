use crossbeam::channel::{Receiver, Sender, bounded};
use std::ops::Deref;
use std::sync::{Arc, Condvar, Mutex};

/// Bounded producer/consumer queue with a completion barrier.
///
/// `put` blocks while the queue holds `capacity` items. Every item taken with
/// [`WorkQueue::get`] is counted as unfinished until its [`Claimed`] guard is
/// dropped; [`WorkQueue::join`] waits for that count to reach zero.
pub struct WorkQueue<T> {
    work_tx: Sender<T>,
    work_rx: Receiver<T>,
    unfinished: Arc<Unfinished>,
}

#[derive(Default)]
struct Unfinished {
    count: Mutex<usize>,
    all_done: Condvar,
}

impl Unfinished {
    fn increment(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
    }

    fn decrement(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.all_done.notify_all();
        }
    }

    fn wait_for_zero(&self) {
        let mut count = self.count.lock().unwrap_or_else(|e| e.into_inner());
        while *count > 0 {
            count = self.all_done.wait(count).unwrap_or_else(|e| e.into_inner());
        }
    }

    fn current(&self) -> usize {
        *self.count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            work_tx: self.work_tx.clone(),
            work_rx: self.work_rx.clone(),
            unfinished: self.unfinished.clone(),
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn new(capacity: usize) -> Self {
        let (work_tx, work_rx) = bounded(capacity.max(1));
        Self {
            work_tx,
            work_rx,
            unfinished: Arc::new(Unfinished::default()),
        }
    }

    /// Enqueue an item, blocking while the queue is full
    pub fn put(&self, item: T) {
        // Counted before the send so a fast worker can't finish it first
        self.unfinished.increment();
        if self.work_tx.send(item).is_err() {
            // Unreachable while `self` holds a receiver; keep the count honest anyway
            self.unfinished.decrement();
        }
    }

    /// Block until an item is available
    pub fn get(&self) -> Option<Claimed<T>> {
        self.work_rx.recv().ok().map(|item| Claimed {
            item,
            unfinished: self.unfinished.clone(),
        })
    }

    /// Block until every item ever enqueued has been claimed and released
    pub fn join(&self) {
        self.unfinished.wait_for_zero();
    }

    /// Items enqueued but not yet released
    pub fn unfinished(&self) -> usize {
        self.unfinished.current()
    }

    pub fn capacity(&self) -> usize {
        self.work_tx.capacity().unwrap_or(0)
    }
}

/// An item taken from a [`WorkQueue`]; dropping it marks the item done.
pub struct Claimed<T> {
    item: T,
    unfinished: Arc<Unfinished>,
}

impl<T> Deref for Claimed<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T> Drop for Claimed<T> {
    fn drop(&mut self) {
        self.unfinished.decrement();
    }
}
