// src/exec/executor.rs

//! The parallel DAG executor.
//!
//! Bookkeeping runs on whichever worker thread just finished a node; there
//! is no scheduler thread. The per-child atomic decrement in
//! [`node_finished`] is what guarantees exactly-once dispatch when several
//! parents of the same child finish concurrently: the decrementer that
//! observes the transition to zero owns the submission.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::graph::{DependencyGraph, Node};
use crate::pool::{PoolSubmitter, TaskOutcome, ThreadPool, WorkItem};

use super::action::Action;
use super::report::{NodeResult, RunReport};

/// Terminal status per node, written exactly once via compare-exchange.
mod status {
    pub const PENDING: u8 = 0;
    pub const SUCCEEDED: u8 = 1;
    pub const FAILED: u8 = 2;
    pub const SKIPPED: u8 = 3;
}

struct RunState<A> {
    /// Predecessors of node `i` not yet completed. Dispatch happens on the
    /// transition to zero, claimed by exactly one decrementer.
    remaining: Vec<AtomicUsize>,
    status: Vec<AtomicU8>,
    /// Failure per node, written before the node settles.
    errors: Mutex<Vec<Option<Arc<anyhow::Error>>>>,
    /// Count of settled nodes; the run finishes when it reaches the graph
    /// size.
    settled: Mutex<usize>,
    all_settled: Condvar,
    graph: Arc<DependencyGraph<A>>,
}

/// Run every node of `graph` exactly once, parent-before-child, with as
/// much parallelism as the pool allows. Blocks the caller until every node
/// has settled.
///
/// Precondition: the graph is acyclic. Nodes on a cycle would never become
/// ready and the run would never terminate.
///
/// A node failure settles all of its descendants as [`NodeResult::Skipped`]
/// but leaves independent subtrees running; the returned report enumerates
/// the outcome of every node. Submissions rejected by a concurrently
/// shut-down pool are recorded as node failures the same way, so the run
/// still terminates.
pub fn run_parallel<A>(graph: Arc<DependencyGraph<A>>, pool: &ThreadPool) -> RunReport
where
    A: Action + 'static,
{
    if graph.is_empty() {
        return RunReport::new(Vec::new());
    }

    let len = graph.len();
    let state = Arc::new(RunState {
        remaining: (0..len)
            .map(|i| AtomicUsize::new(graph.parent_count(i)))
            .collect(),
        status: (0..len).map(|_| AtomicU8::new(status::PENDING)).collect(),
        errors: Mutex::new(vec![None; len]),
        settled: Mutex::new(0),
        all_settled: Condvar::new(),
        graph,
    });
    let submitter = pool.submitter();

    let roots: Vec<usize> = state.graph.roots().collect();
    debug!(nodes = len, roots = roots.len(), "starting parallel run");
    for index in roots {
        submit_node(&state, &submitter, index);
    }

    {
        let mut settled = state.settled.lock();
        while *settled < len {
            state.all_settled.wait(&mut settled);
        }
    }

    let mut errors = state.errors.lock();
    let results = (0..len)
        .map(|index| match state.status[index].load(Ordering::Acquire) {
            status::SUCCEEDED => NodeResult::Succeeded,
            status::FAILED => {
                let error = errors[index]
                    .take()
                    .unwrap_or_else(|| Arc::new(anyhow::anyhow!("action failed")));
                NodeResult::Failed(error)
            }
            _ => NodeResult::Skipped,
        })
        .collect();
    drop(errors);

    let report = RunReport::new(results);
    info!(
        nodes = len,
        succeeded = report.succeeded().count(),
        failed = report.failed().count(),
        never_ran = report.never_ran().count(),
        "run finished"
    );
    report
}

/// Ready -> Running: hand the node's payload to the pool, with a
/// continuation that performs the readiness bookkeeping on the thread that
/// ran it.
fn submit_node<A>(state: &Arc<RunState<A>>, submitter: &PoolSubmitter, index: usize)
where
    A: Action + 'static,
{
    let mode = state.graph.node(index).payload().exec_mode();
    let job_state = Arc::clone(state);
    let done_state = Arc::clone(state);
    let done_submitter = submitter.clone();

    let item = WorkItem::new(mode, move || job_state.graph.node(index).payload().call())
        .on_complete(move |outcome| node_finished(&done_state, &done_submitter, index, outcome));

    debug!(node = index, ?mode, "submitting node");
    if let Err(error) = submitter.submit(item) {
        warn!(node = index, error = %error, "submission rejected; failing node");
        record_failure(state, index, Arc::new(anyhow::Error::from(error)));
    }
}

/// Running -> Done: settle this node, then update successor readiness.
fn node_finished<A>(
    state: &Arc<RunState<A>>,
    submitter: &PoolSubmitter,
    index: usize,
    outcome: &TaskOutcome,
) where
    A: Action + 'static,
{
    match outcome {
        TaskOutcome::Success => {
            if !claim(state, index, status::SUCCEEDED) {
                return;
            }
            settle_one(state);
            for child in state.graph.children_of(index) {
                let child_index = child.index();
                if state.remaining[child_index].fetch_sub(1, Ordering::AcqRel) == 1 {
                    submit_node(state, submitter, child_index);
                }
            }
        }
        TaskOutcome::Failed(error) => record_failure(state, index, Arc::clone(error)),
        TaskOutcome::Panicked(message) => record_failure(
            state,
            index,
            Arc::new(anyhow::anyhow!("action panicked: {message}")),
        ),
        TaskOutcome::Cancelled => record_failure(
            state,
            index,
            Arc::new(anyhow::anyhow!("cancelled before execution")),
        ),
    }
}

fn record_failure<A: Action>(state: &RunState<A>, index: usize, error: Arc<anyhow::Error>) {
    if !claim(state, index, status::FAILED) {
        return;
    }
    warn!(node = index, error = %error, "node failed; its descendants will never run");
    state.errors.lock()[index] = Some(error);
    settle_one(state);
    skip_descendants(state, index);
}

/// Settle every descendant of a failed node as skipped.
///
/// Safe to do eagerly: a failed node never decrements its children's
/// counters, so none of these nodes can reach the dispatch point. The claim
/// keeps the walk exactly-once when a node descends from several failures.
fn skip_descendants<A: Action>(state: &RunState<A>, index: usize) {
    let mut stack: Vec<usize> = state.graph.children_of(index).map(Node::index).collect();
    while let Some(node) = stack.pop() {
        if claim(state, node, status::SKIPPED) {
            settle_one(state);
            stack.extend(state.graph.children_of(node).map(Node::index));
        }
    }
}

/// Transition a node out of `Pending`, exactly once.
fn claim<A: Action>(state: &RunState<A>, index: usize, to: u8) -> bool {
    state.status[index]
        .compare_exchange(status::PENDING, to, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}

fn settle_one<A: Action>(state: &RunState<A>) {
    let mut settled = state.settled.lock();
    *settled += 1;
    if *settled == state.graph.len() {
        state.all_settled.notify_all();
    }
}
