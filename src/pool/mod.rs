// src/pool/mod.rs

//! Purpose-built thread pool.
//!
//! A fixed set of OS worker threads consumes a shared FIFO queue guarded by
//! a mutex and a condition variable; idle workers block, they never spin.
//! Work items are either `Pooled` (queued, run by any idle worker) or
//! `Dedicated` (given their own background thread, for long-running work
//! that should not starve the pool).
//!
//! - [`work_item`] defines the unit of dispatch and its execution mode.
//! - [`handle`] defines the caller-side [`TaskHandle`] and terminal
//!   [`TaskOutcome`] of a submitted item.
//! - [`pool`] owns the worker threads, the queue, and the
//!   graceful/immediate shutdown protocol.

pub mod handle;
pub mod pool;
pub mod work_item;

pub use handle::{TaskHandle, TaskOutcome};
pub use pool::{PoolError, PoolSubmitter, ShutdownMode, ThreadPool};
pub use work_item::{ExecMode, WorkItem};
