// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level run manifest as read from a TOML file.
///
/// ```toml
/// [pool]
/// workers = 4
///
/// [action.build]
/// cmd = "cargo build"
///
/// [action.test]
/// cmd = "cargo test"
/// after = ["build"]
/// ```
///
/// The `[pool]` section is optional and defaults to the machine's available
/// parallelism.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Worker pool settings from `[pool]`.
    #[serde(default)]
    pub pool: PoolSection,

    /// All actions from `[action.<name>]`.
    ///
    /// Keys are the *action names*; node indices are assigned in key order.
    #[serde(default)]
    pub action: BTreeMap<String, ActionConfig>,
}

/// `[pool]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    /// Number of worker threads for pooled actions.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

/// `[action.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionConfig {
    /// The command to execute.
    pub cmd: String,

    /// Dependency list: this action waits for all actions listed here.
    ///
    /// This is the TOML `after = ["A", "B"]` field.
    #[serde(default)]
    pub after: Vec<String>,

    /// Run on a dedicated thread instead of the shared worker pool.
    ///
    /// Meant for long-running commands that would otherwise occupy a pooled
    /// worker for their whole duration.
    #[serde(default)]
    pub dedicated: bool,
}
