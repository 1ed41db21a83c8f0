// src/exec/action.rs

use crate::pool::ExecMode;

/// The opaque, zero-argument work carried by a graph node.
///
/// Neither the executor nor the thread pool interprets the payload beyond
/// invoking it; an `Err` marks the node failed without affecting unrelated
/// branches of the graph.
pub trait Action: Send + Sync {
    fn call(&self) -> anyhow::Result<()>;

    /// Whether to run on the shared worker pool or on a dedicated thread
    /// (for long-running work that would otherwise starve pooled items).
    fn exec_mode(&self) -> ExecMode {
        ExecMode::Pooled
    }
}

impl<F> Action for F
where
    F: Fn() -> anyhow::Result<()> + Send + Sync,
{
    fn call(&self) -> anyhow::Result<()> {
        self()
    }
}
