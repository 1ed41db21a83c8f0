// src/pool/handle.rs

//! Caller-side view of a submitted work item.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Terminal outcome of one submitted work item.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    Success,
    /// The job body returned an error.
    Failed(Arc<anyhow::Error>),
    /// The job body panicked; the thread that ran it survived.
    Panicked(String),
    /// Discarded from the queue by an immediate shutdown before starting.
    Cancelled,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

#[derive(Default)]
struct HandleState {
    outcome: Mutex<Option<TaskOutcome>>,
    settled: Condvar,
}

/// Handle to a submitted work item.
///
/// Settles exactly once, when the item finishes (or is discarded by an
/// immediate shutdown). Cloning yields another view of the same item.
#[derive(Clone)]
pub struct TaskHandle {
    state: Arc<HandleState>,
}

impl TaskHandle {
    pub(super) fn new() -> Self {
        Self {
            state: Arc::new(HandleState::default()),
        }
    }

    /// Block until the item settles.
    pub fn wait(&self) -> TaskOutcome {
        let mut outcome = self.state.outcome.lock();
        loop {
            if let Some(outcome) = outcome.as_ref() {
                return outcome.clone();
            }
            self.state.settled.wait(&mut outcome);
        }
    }

    /// Non-blocking probe; `None` while the item has not settled.
    pub fn try_outcome(&self) -> Option<TaskOutcome> {
        self.state.outcome.lock().clone()
    }

    /// First write wins; later calls are ignored.
    pub(super) fn settle(&self, outcome: TaskOutcome) {
        let mut slot = self.state.outcome.lock();
        if slot.is_none() {
            *slot = Some(outcome);
            self.state.settled.notify_all();
        }
    }
}
