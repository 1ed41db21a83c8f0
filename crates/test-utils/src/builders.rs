#![allow(dead_code)]

use std::collections::BTreeMap;
use dagrun::config::{ActionConfig, Manifest, PoolSection};

/// Builder for `Manifest` to simplify test setup.
pub struct ManifestBuilder {
    manifest: Manifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            manifest: Manifest {
                pool: PoolSection::default(),
                action: BTreeMap::new(),
            },
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.manifest.pool.workers = workers;
        self
    }

    pub fn with_action(mut self, name: &str, action: ActionConfig) -> Self {
        self.manifest.action.insert(name.to_string(), action);
        self
    }

    pub fn build(self) -> Manifest {
        self.manifest
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ActionConfig`.
pub struct ActionConfigBuilder {
    action: ActionConfig,
}

impl ActionConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            action: ActionConfig {
                cmd: cmd.to_string(),
                after: vec![],
                dedicated: false,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.action.after.push(dep.to_string());
        self
    }

    pub fn dedicated(mut self, val: bool) -> Self {
        self.action.dedicated = val;
        self
    }

    pub fn build(self) -> ActionConfig {
        self.action
    }
}
