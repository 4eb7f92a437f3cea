//! Bounded work queue with dynamic fan-out and exact quiescence detection.
//!
//! Every dispatched task is polled from inside [`WorkQueue::run`], so a task
//! that discovers more work calls [`QueueHandle::add`] before its own
//! completion is observed. The quiescence check and the `closed` flag are
//! updated under the same lock, which makes "done" fire exactly once.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use export_logging::{export_debug, export_trace, export_warn};
use futures_util::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;

/// A route submitted for processing.
pub type WorkItem = String;

pub const DEFAULT_MAX_CONCURRENT: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueOptions {
    /// Upper bound on tasks in flight. Values below 1 are treated as 1.
    pub max_concurrent: usize,
    /// Drop items whose value was already accepted once.
    pub dedupe: bool,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            dedupe: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue already drained; rejected {0}")]
    Closed(WorkItem),
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<WorkItem>,
    in_flight: usize,
    peak_in_flight: usize,
    closed: bool,
    seen: Option<HashSet<WorkItem>>,
}

/// Cloneable handle used to add work, including from inside a running task.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    state: Arc<Mutex<QueueState>>,
}

impl QueueHandle {
    fn new(dedupe: bool) -> Self {
        let state = QueueState {
            seen: dedupe.then(HashSet::new),
            ..QueueState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an item to the back of the pending sequence.
    ///
    /// Returns `Ok(false)` when deduplication is enabled and the item was
    /// already accepted earlier, and `Err(QueueError::Closed)` once the queue
    /// has reached quiescence.
    pub fn add(&self, item: impl Into<WorkItem>) -> Result<bool, QueueError> {
        let item = item.into();
        let mut state = self.lock();
        if state.closed {
            export_warn!("Rejected {} after the queue finished", item);
            return Err(QueueError::Closed(item));
        }
        if let Some(seen) = state.seen.as_mut() {
            if !seen.insert(item.clone()) {
                export_trace!("Skipping already queued {}", item);
                return Ok(false);
            }
        }
        state.pending.push_back(item);
        Ok(true)
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// Outcome of one [`WorkQueue::run`].
#[derive(Debug)]
pub struct QueueReport<T, E> {
    pub processed: usize,
    pub peak_in_flight: usize,
    pub completed: Vec<T>,
    pub failures: Vec<(WorkItem, E)>,
}

impl<T, E> QueueReport<T, E> {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

pub struct WorkQueue<F> {
    handle: QueueHandle,
    max_concurrent: usize,
    process: F,
}

impl<F, Fut, T, E> WorkQueue<F>
where
    F: Fn(WorkItem, QueueHandle) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    pub fn new(options: QueueOptions, process: F) -> Self {
        let max_concurrent = if options.max_concurrent == 0 {
            export_warn!("max_concurrent of 0 requested; using 1");
            1
        } else {
            options.max_concurrent
        };
        Self {
            handle: QueueHandle::new(options.dedupe),
            max_concurrent,
            process,
        }
    }

    pub fn handle(&self) -> QueueHandle {
        self.handle.clone()
    }

    pub fn add(&self, item: impl Into<WorkItem>) -> Result<bool, QueueError> {
        self.handle.add(item)
    }

    /// Drain the queue, keeping at most `max_concurrent` tasks in flight.
    ///
    /// Resolves once nothing is pending and nothing is in flight. A failed
    /// task is recorded and scheduling continues.
    pub async fn run(self) -> QueueReport<T, E> {
        let mut running = FuturesUnordered::new();
        let mut report = QueueReport {
            processed: 0,
            peak_in_flight: 0,
            completed: Vec::new(),
            failures: Vec::new(),
        };

        loop {
            let batch = {
                let mut state = self.handle.lock();
                let mut batch = Vec::new();
                while state.in_flight < self.max_concurrent {
                    let Some(item) = state.pending.pop_front() else {
                        break;
                    };
                    state.in_flight += 1;
                    batch.push(item);
                }
                state.peak_in_flight = state.peak_in_flight.max(state.in_flight);
                if state.in_flight == 0 {
                    state.closed = true;
                    report.peak_in_flight = state.peak_in_flight;
                    break;
                }
                batch
            };

            // Futures are built outside the lock so `process` may call `add` eagerly.
            for item in batch {
                export_trace!("Dispatching {}", item);
                let task = (self.process)(item.clone(), self.handle.clone());
                running.push(async move { (item, task.await) });
            }

            let Some((item, result)) = running.next().await else {
                continue;
            };
            self.handle.lock().in_flight -= 1;
            report.processed += 1;
            match result {
                Ok(output) => report.completed.push(output),
                Err(err) => {
                    export_warn!("Processing {} failed: {}", item, err);
                    report.failures.push((item, err));
                }
            }
        }

        export_debug!(
            "Queue drained: {} processed, {} failed, peak concurrency {}",
            report.processed,
            report.failures.len(),
            report.peak_in_flight
        );
        report
    }
}
