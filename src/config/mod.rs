// src/config/mod.rs

//! Run manifest: loading, data model, and validation.
//!
//! The manifest is a TOML file declaring a `[pool]` section and one
//! `[action.<name>]` section per action. Validation rejects empty
//! manifests, unknown or self `after` references, a zero worker count, and
//! cyclic dependency declarations, so everything downstream can assume an
//! acyclic DAG.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ActionConfig, Manifest, PoolSection};
