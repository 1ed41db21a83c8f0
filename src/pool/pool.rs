// src/pool/pool.rs

//! Fixed worker set, shared queue, and the shutdown protocol.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::handle::{TaskHandle, TaskOutcome};
use super::work_item::{CompletionFn, ExecMode, Job, WorkItem};

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker count must be at least 1")]
    InvalidConfiguration,

    #[error("pool is shutting down; submission rejected")]
    ShuttingDown,

    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// How to wind the pool down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Stop accepting submissions, let queued and in-flight items finish,
    /// then join all threads.
    Graceful,
    /// Additionally discard queued-but-not-started items (their handles
    /// settle [`TaskOutcome::Cancelled`]); in-flight items still finish.
    Immediate,
}

/// Shutdown phase, observed by workers at every dequeue point.
///
/// Threads are never terminated forcefully: killing a thread mid-item could
/// abandon the queue mutex or leave a caller's shared state half-updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    /// Drain the queue, then exit.
    Draining,
    /// Queue already discarded; exit at the next dequeue point.
    Halting,
}

struct QueuedJob {
    job: Job,
    handle: TaskHandle,
    on_complete: Option<CompletionFn>,
}

struct PoolState {
    queue: VecDeque<QueuedJob>,
    phase: Phase,
}

struct PoolShared {
    state: Mutex<PoolState>,
    work_available: Condvar,
    /// Join handles for dedicated threads, collected at shutdown.
    dedicated: Mutex<Vec<JoinHandle<()>>>,
    dedicated_seq: AtomicUsize,
}

/// Bounded set of worker threads consuming a shared FIFO queue.
///
/// Workers block on a condition variable while the queue is empty and are
/// woken one-per-submission. Dedicated items bypass the queue entirely and
/// get their own background thread.
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Start `worker_count` workers immediately.
    pub fn new(worker_count: usize) -> Result<Self, PoolError> {
        if worker_count == 0 {
            return Err(PoolError::InvalidConfiguration);
        }

        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                phase: Phase::Running,
            }),
            work_available: Condvar::new(),
            dedicated: Mutex::new(Vec::new()),
            dedicated_seq: AtomicUsize::new(0),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("dagrun-worker-{worker_id}"))
                .spawn(move || worker_loop(worker_id, &shared))?;
            workers.push(handle);
        }

        info!(worker_count, "thread pool started");
        Ok(Self {
            shared,
            workers: Mutex::new(workers),
        })
    }

    /// Submit a work item; fails once shutdown has begun.
    pub fn submit(&self, item: WorkItem) -> Result<TaskHandle, PoolError> {
        submit_shared(&self.shared, item)
    }

    /// A cloneable submission handle detached from the pool's lifetime.
    ///
    /// Completion continuations run on worker threads and use this to
    /// submit follow-up work without borrowing the pool itself.
    pub fn submitter(&self) -> PoolSubmitter {
        PoolSubmitter {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Wind the pool down and join every thread it started.
    ///
    /// Idempotent; a second call (or `Drop`) finds nothing left to join.
    pub fn shutdown(&self, mode: ShutdownMode) {
        let discarded = {
            let mut state = self.shared.state.lock();
            match mode {
                ShutdownMode::Graceful => {
                    if state.phase == Phase::Running {
                        state.phase = Phase::Draining;
                    }
                    Vec::new()
                }
                ShutdownMode::Immediate => {
                    state.phase = Phase::Halting;
                    state.queue.drain(..).collect::<Vec<_>>()
                }
            }
        };
        self.shared.work_available.notify_all();

        if !discarded.is_empty() {
            debug!(count = discarded.len(), "discarding queued items");
        }
        for queued in discarded {
            queued.handle.settle(TaskOutcome::Cancelled);
            if let Some(callback) = queued.on_complete {
                callback(&TaskOutcome::Cancelled);
            }
        }

        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        for handle in workers {
            if handle.join().is_err() {
                warn!("worker thread panicked during shutdown");
            }
        }
        let dedicated: Vec<_> = self.shared.dedicated.lock().drain(..).collect();
        for handle in dedicated {
            if handle.join().is_err() {
                warn!("dedicated thread panicked during shutdown");
            }
        }

        info!(?mode, "thread pool shut down");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown(ShutdownMode::Graceful);
    }
}

/// Cloneable submission handle (see [`ThreadPool::submitter`]).
#[derive(Clone)]
pub struct PoolSubmitter {
    shared: Arc<PoolShared>,
}

impl PoolSubmitter {
    pub fn submit(&self, item: WorkItem) -> Result<TaskHandle, PoolError> {
        submit_shared(&self.shared, item)
    }
}

fn submit_shared(shared: &Arc<PoolShared>, item: WorkItem) -> Result<TaskHandle, PoolError> {
    let WorkItem {
        mode,
        job,
        on_complete,
    } = item;
    let handle = TaskHandle::new();

    match mode {
        ExecMode::Pooled => {
            let mut state = shared.state.lock();
            if state.phase != Phase::Running {
                return Err(PoolError::ShuttingDown);
            }
            state.queue.push_back(QueuedJob {
                job,
                handle: handle.clone(),
                on_complete,
            });
            drop(state);
            // Wake one blocked worker; if none is blocked the item is picked
            // up by the next worker returning to idle.
            shared.work_available.notify_one();
        }
        ExecMode::Dedicated => {
            // Spawn while holding the state lock so a concurrent shutdown
            // either rejects this submission or joins the new thread.
            let state = shared.state.lock();
            if state.phase != Phase::Running {
                return Err(PoolError::ShuttingDown);
            }
            let seq = shared.dedicated_seq.fetch_add(1, Ordering::Relaxed);
            let job_handle = handle.clone();
            let join = thread::Builder::new()
                .name(format!("dagrun-dedicated-{seq}"))
                .spawn(move || run_job(job, &job_handle, on_complete))?;
            shared.dedicated.lock().push(join);
            drop(state);
        }
    }

    Ok(handle)
}

fn worker_loop(worker_id: usize, shared: &PoolShared) {
    debug!(worker_id, "worker started");
    loop {
        let next = {
            let mut state = shared.state.lock();
            loop {
                match state.phase {
                    Phase::Halting => break None,
                    Phase::Draining => break state.queue.pop_front(),
                    Phase::Running => match state.queue.pop_front() {
                        Some(queued) => break Some(queued),
                        None => shared.work_available.wait(&mut state),
                    },
                }
            }
        };
        let Some(queued) = next else { break };
        run_job(queued.job, &queued.handle, queued.on_complete);
    }
    debug!(worker_id, "worker exiting");
}

/// Run one job body, settle its handle, then fire the continuation, all on
/// the current thread. A failing or panicking body never takes the thread
/// down with it.
fn run_job(job: Job, handle: &TaskHandle, on_complete: Option<CompletionFn>) {
    let outcome = match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(())) => TaskOutcome::Success,
        Ok(Err(error)) => {
            debug!(error = %error, "work item returned an error");
            TaskOutcome::Failed(Arc::new(error))
        }
        Err(payload) => {
            let message = panic_message(payload);
            warn!(message = %message, "work item panicked");
            TaskOutcome::Panicked(message)
        }
    };

    handle.settle(outcome.clone());
    if let Some(callback) = on_complete {
        callback(&outcome);
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
