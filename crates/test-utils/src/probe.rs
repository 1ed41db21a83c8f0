#![allow(dead_code)]

//! A controllable action payload for executor tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::time::{Duration, Instant};

use anyhow::bail;
use dagrun::exec::Action;
use dagrun::pool::ExecMode;

#[derive(Default)]
struct Recorder {
    runs: AtomicUsize,
    started: Mutex<Option<Instant>>,
    finished: Mutex<Option<Instant>>,
}

/// Test action that counts invocations, records start/finish instants, and
/// can optionally rendezvous on a barrier, sleep, fail, or panic.
pub struct ProbeAction {
    recorder: Arc<Recorder>,
    barrier: Option<Arc<Barrier>>,
    delay: Option<Duration>,
    fail: bool,
    panic: bool,
    mode: ExecMode,
}

impl ProbeAction {
    pub fn new() -> Self {
        Self {
            recorder: Arc::new(Recorder::default()),
            barrier: None,
            delay: None,
            fail: false,
            panic: false,
            mode: ExecMode::Pooled,
        }
    }

    /// Wait on this barrier before doing anything else, so several probes
    /// can be released at the same instant.
    pub fn with_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.barrier = Some(barrier);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic = true;
        self
    }

    pub fn dedicated(mut self) -> Self {
        self.mode = ExecMode::Dedicated;
        self
    }

    /// Observer kept by the test after the action moves into the graph.
    pub fn probe(&self) -> Probe {
        Probe {
            recorder: Arc::clone(&self.recorder),
        }
    }
}

impl Default for ProbeAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for ProbeAction {
    fn call(&self) -> anyhow::Result<()> {
        {
            let mut started = self.recorder.started.lock().unwrap();
            started.get_or_insert_with(Instant::now);
        }

        if let Some(barrier) = &self.barrier {
            barrier.wait();
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        self.recorder.runs.fetch_add(1, Ordering::SeqCst);
        *self.recorder.finished.lock().unwrap() = Some(Instant::now());

        if self.panic {
            panic!("probe action panicked on purpose");
        }
        if self.fail {
            bail!("probe action failed on purpose");
        }
        Ok(())
    }

    fn exec_mode(&self) -> ExecMode {
        self.mode
    }
}

/// Read-only view of a [`ProbeAction`]'s recorded execution.
#[derive(Clone)]
pub struct Probe {
    recorder: Arc<Recorder>,
}

impl Probe {
    pub fn runs(&self) -> usize {
        self.recorder.runs.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> Option<Instant> {
        *self.recorder.started.lock().unwrap()
    }

    pub fn finished_at(&self) -> Option<Instant> {
        *self.recorder.finished.lock().unwrap()
    }
}
